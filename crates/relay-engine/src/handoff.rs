//! Prompt construction between stages.
//!
//! Each stage receives exactly one `user` turn. Its content is the stage's
//! own handoff template when it has one, otherwise a default framing that
//! depends on whether the stage is first in the chain.

use relay_core::stage::{INPUT_PLACEHOLDER, PREVIOUS_STAGE_PLACEHOLDER};
use relay_core::{ConversationTurn, Stage};

/// Framing for the first stage: the input is the user's original request.
pub const FIRST_STAGE_TEMPLATE: &str =
    "Here is the original request:\n\n{input}\n\nRespond according to your instructions.";

/// Framing for every later stage: the input is the previous stage's output.
pub const NEXT_STAGE_TEMPLATE: &str = "Given the output of the previous stage ({previous_stage}):\n\n{input}\n\nProduce the next artifact appropriate to your instructions.";

/// Build the conversation for the stage at `index`.
///
/// `previous_stage` is the name of the stage that produced `prior_output`,
/// or `None` for the first stage (whose input is the seed prompt).
pub fn build_conversation(
    stage: &Stage,
    index: usize,
    prior_output: &str,
    previous_stage: Option<&str>,
) -> Vec<ConversationTurn> {
    let template = match stage.handoff() {
        Some(template) => template,
        None if index == 0 => FIRST_STAGE_TEMPLATE,
        None => NEXT_STAGE_TEMPLATE,
    };
    vec![ConversationTurn::user(render(
        template,
        prior_output,
        previous_stage.unwrap_or(""),
    ))]
}

/// Substitute the two placeholders in one left-to-right pass over the
/// template. Substituted text is never scanned again, so braces inside the
/// input or a stage name come through as written.
pub fn render(template: &str, input: &str, previous_stage: &str) -> String {
    let mut out = String::with_capacity(template.len() + input.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix(INPUT_PLACEHOLDER) {
            out.push_str(input);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(PREVIOUS_STAGE_PLACEHOLDER) {
            out.push_str(previous_stage);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::Role;

    fn stage(name: &str) -> Stage {
        Stage::new(name, "do the thing").unwrap()
    }

    #[test]
    fn first_stage_default_frames_original_request() {
        let turns = build_conversation(&stage("A"), 0, "hello", None);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(
            turns[0].content,
            "Here is the original request:\n\nhello\n\nRespond according to your instructions."
        );
    }

    #[test]
    fn later_stage_default_names_previous_stage() {
        let turns = build_conversation(&stage("B"), 1, "SUMMARY", Some("A"));
        assert_eq!(turns.len(), 1);
        assert!(turns[0].content.starts_with("Given the output of the previous stage (A):"));
        assert!(turns[0].content.contains("\n\nSUMMARY\n\n"));
    }

    #[test]
    fn custom_handoff_wins_over_defaults() {
        let s = stage("B")
            .with_handoff("Based on the market trends analysis: {input}, what next?")
            .unwrap();
        let turns = build_conversation(&s, 1, "EVs are growing", Some("A"));
        assert_eq!(
            turns[0].content,
            "Based on the market trends analysis: EVs are growing, what next?"
        );
    }

    #[test]
    fn bare_input_template_passes_seed_through() {
        let s = stage("A").with_handoff("{input}").unwrap();
        let turns = build_conversation(&s, 0, "As the CEO, I need...", None);
        assert_eq!(turns[0].content, "As the CEO, I need...");
    }

    #[test]
    fn previous_stage_is_empty_for_first_stage() {
        assert_eq!(render("[{previous_stage}] {input}", "x", ""), "[] x");
    }

    #[test]
    fn render_does_not_reinterpolate_input() {
        let out = render("{previous_stage}: {input}", "literal {previous_stage} and {input}", "A");
        assert_eq!(out, "A: literal {previous_stage} and {input}");
    }

    #[test]
    fn stage_name_with_braces_is_not_reinterpolated() {
        let out = render(
            "Given the output of the previous stage ({previous_stage}):\n\n{input}",
            "OUT",
            "Review{input}",
        );
        assert_eq!(out, "Given the output of the previous stage (Review{input}):\n\nOUT");
    }

    #[test]
    fn unknown_braces_pass_through() {
        assert_eq!(render("{json: {input}} {other}", "1", "A"), "{json: 1} {other}");
        assert_eq!(render("trailing {", "x", ""), "trailing {");
    }

    #[test]
    fn render_replaces_every_occurrence() {
        assert_eq!(render("{input}/{input}", "x", ""), "x/x");
    }
}
