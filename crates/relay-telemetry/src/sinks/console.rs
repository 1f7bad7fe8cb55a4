use std::io::Write;

use parking_lot::Mutex;
use relay_core::{ResultSink, StageResult};

/// Prints each stage's response under a human-readable heading.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl ResultSink for ConsoleSink {
    fn record(&self, result: &StageResult) {
        let heading = display_name(&result.stage_name);
        let mut out = self.out.lock();

        // Blank line between stages, as in a transcript.
        let separator = if result.stage_index > 0 { "\n" } else { "" };
        let written = if result.succeeded {
            writeln!(out, "{separator}{heading} Response:\n{}", result.output)
        } else {
            writeln!(
                out,
                "{separator}An error occurred in {heading}: {}",
                result.error.as_deref().unwrap_or("unknown error")
            )
        };

        if let Err(e) = written.and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "console sink write failed");
        }
    }
}

/// Split a CamelCase stage name into words: `MarketTrendsAnalyst` becomes
/// `Market Trends Analyst`. Names that already contain spaces or
/// separators are returned with `_`/`-` turned into spaces.
pub fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 8);
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.ends_with(' ') {
                out.push(' ');
            }
            continue;
        }
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // "HTTPServer" -> "HTTP Server": break before the last capital of a run.
            if (prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower))
                && !out.ends_with(' ')
            {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::RunId;
    use std::sync::Arc;

    /// Writer that shares its buffer so the test can read what was written.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    #[test]
    fn display_name_splits_camel_case() {
        assert_eq!(display_name("MarketTrendsAnalyst"), "Market Trends Analyst");
        assert_eq!(
            display_name("ProductDevelopmentConsultant"),
            "Product Development Consultant"
        );
        assert_eq!(display_name("A"), "A");
        assert_eq!(display_name("launch_strategy"), "launch strategy");
        assert_eq!(display_name("HTTPServer"), "HTTP Server");
        assert_eq!(display_name("Already Spaced"), "Already Spaced");
    }

    #[test]
    fn success_printed_under_heading() {
        let buf = SharedBuf::default();
        let sink = ConsoleSink::new(Box::new(buf.clone()));
        let id = RunId::new();

        sink.record(&StageResult::success(id.clone(), 0, "MarketTrendsAnalyst", "EVs are up", 1));
        sink.record(&StageResult::success(id, 1, "LaunchStrategyAdvisor", "Go big", 1));

        assert_eq!(
            buf.contents(),
            "Market Trends Analyst Response:\nEVs are up\n\nLaunch Strategy Advisor Response:\nGo big\n"
        );
    }

    #[test]
    fn failure_printed_as_error() {
        let buf = SharedBuf::default();
        let sink = ConsoleSink::new(Box::new(buf.clone()));
        sink.record(&StageResult::failure(RunId::new(), 0, "A", "rate limited", 1));
        assert_eq!(buf.contents(), "An error occurred in A: rate limited\n");
    }
}
