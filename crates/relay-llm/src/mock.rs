use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use relay_core::messages::ConversationTurn;
use relay_core::responder::Responder;
use relay_core::ResponderError;

/// Pre-programmed replies for deterministic testing without API calls.
#[derive(Clone, Debug)]
pub enum ScriptedReply {
    Text(String),
    Error(ResponderError),
    /// Wait a duration, then resolve the inner reply.
    Delay(Duration, Box<ScriptedReply>),
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ResponderError::new(message))
    }

    pub fn delayed(delay: Duration, inner: ScriptedReply) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// What the responder was asked on one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub role: String,
    pub conversation: Vec<ConversationTurn>,
}

impl RecordedCall {
    /// All turn contents joined, for substring assertions.
    pub fn content(&self) -> String {
        self.conversation
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Responder that returns scripted replies in call order and records every
/// call it receives.
pub struct ScriptedResponder {
    replies: Vec<ScriptedReply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedResponder {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn respond(
        &self,
        role: &str,
        conversation: &[ConversationTurn],
    ) -> Result<String, ResponderError> {
        let idx = {
            let mut calls = self.calls.lock();
            calls.push(RecordedCall {
                role: role.to_string(),
                conversation: conversation.to_vec(),
            });
            calls.len() - 1
        };

        let Some(reply) = self.replies.get(idx) else {
            return Err(ResponderError::new(format!(
                "ScriptedResponder: no reply configured for call {idx}"
            )));
        };

        resolve_reply(reply).await
    }
}

/// Unrolls nested delays iteratively to avoid recursive async.
async fn resolve_reply(reply: &ScriptedReply) -> Result<String, ResponderError> {
    let mut current = reply;
    loop {
        match current {
            ScriptedReply::Text(text) => return Ok(text.clone()),
            ScriptedReply::Error(e) => return Err(e.clone()),
            ScriptedReply::Delay(duration, inner) => {
                tokio::time::sleep(*duration).await;
                current = inner;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_replies() {
        let mock = ScriptedResponder::new(vec![
            ScriptedReply::text("first"),
            ScriptedReply::text("second"),
        ]);

        let a = mock.respond("r", &[ConversationTurn::user("1")]).await.unwrap();
        let b = mock.respond("r", &[ConversationTurn::user("2")]).await.unwrap();
        assert_eq!(a, "first");
        assert_eq!(b, "second");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn error_reply() {
        let mock = ScriptedResponder::new(vec![ScriptedReply::error("rate limited")]);
        let err = mock.respond("r", &[]).await.unwrap_err();
        assert_eq!(err.message, "rate limited");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn exhausted_replies() {
        let mock = ScriptedResponder::new(vec![ScriptedReply::text("only one")]);
        let _ = mock.respond("r", &[]).await;
        let err = mock.respond("r", &[]).await.unwrap_err();
        assert!(err.message.contains("no reply configured for call 1"));
    }

    #[tokio::test]
    async fn records_role_and_conversation() {
        let mock = ScriptedResponder::new(vec![ScriptedReply::text("ok")]);
        mock.respond("summarize", &[ConversationTurn::user("hello")])
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].role, "summarize");
        assert_eq!(calls[0].conversation, vec![ConversationTurn::user("hello")]);
        assert_eq!(calls[0].content(), "hello");
    }

    #[tokio::test]
    async fn delayed_reply() {
        tokio::time::pause();
        let mock = ScriptedResponder::new(vec![ScriptedReply::delayed(
            Duration::from_secs(30),
            ScriptedReply::text("after delay"),
        )]);

        let start = tokio::time::Instant::now();
        let text = mock.respond("r", &[]).await.unwrap();
        assert_eq!(text, "after delay");
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[test]
    fn responder_properties() {
        let mock = ScriptedResponder::new(vec![]);
        assert_eq!(mock.name(), "scripted");
        assert_eq!(mock.model(), "scripted-model");
        assert_eq!(mock.call_count(), 0);
    }
}
