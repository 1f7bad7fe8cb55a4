use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use relay_core::{ResultSink, StageResult};

use crate::TelemetryError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Appends one line per stage result to a plain-text log file:
///
/// ```text
/// 2024-10-16 09:41:07,118 - INFO - Stage 1 (MarketTrendsAnalyst) response: ...
/// 2024-10-16 09:41:09,502 - ERROR - Stage 2 (ProductDevelopmentConsultant) failed: ...
/// ```
pub struct LogFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogFileSink {
    /// Open `path` for appending, creating it (and its parent dir) if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for LogFileSink {
    fn record(&self, result: &StageResult) {
        let line = format_line(result, &result.recorded_at.with_timezone(&Local));
        let mut file = self.file.lock();
        if let Err(e) = writeln!(file, "{line}").and_then(|_| file.flush()) {
            tracing::warn!(path = %self.path.display(), error = %e, "log file sink write failed");
        }
    }
}

/// Render one log line. Stage numbers are 1-based.
pub fn format_line<Tz: chrono::TimeZone>(result: &StageResult, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let ts = at.format(TIMESTAMP_FORMAT);
    let number = result.stage_index + 1;
    if result.succeeded {
        format!(
            "{ts} - INFO - Stage {number} ({}) response: {}",
            result.stage_name, result.output
        )
    } else {
        format!(
            "{ts} - ERROR - Stage {number} ({}) failed: {}",
            result.stage_name,
            result.error.as_deref().unwrap_or("unknown error")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use relay_core::RunId;

    fn temp_log_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("relay-test-log-{}", uuid::Uuid::now_v7()))
            .join("agent_logs.log")
    }

    #[test]
    fn success_line_format() {
        let at = Utc.with_ymd_and_hms(2024, 10, 16, 9, 41, 7).unwrap();
        let r = StageResult::success(RunId::new(), 0, "MarketTrendsAnalyst", "EVs", 3);
        assert_eq!(
            format_line(&r, &at),
            "2024-10-16 09:41:07,000 - INFO - Stage 1 (MarketTrendsAnalyst) response: EVs"
        );
    }

    #[test]
    fn failure_line_format() {
        let at = Utc.with_ymd_and_hms(2024, 10, 16, 9, 41, 9).unwrap();
        let r = StageResult::failure(RunId::new(), 1, "ProductDevelopmentConsultant", "HTTP 429", 3);
        assert_eq!(
            format_line(&r, &at),
            "2024-10-16 09:41:09,000 - ERROR - Stage 2 (ProductDevelopmentConsultant) failed: HTTP 429"
        );
    }

    #[test]
    fn appends_across_sinks() {
        let path = temp_log_path();
        let id = RunId::new();

        let sink = LogFileSink::open(&path).unwrap();
        sink.record(&StageResult::success(id.clone(), 0, "A", "SUMMARY", 1));
        drop(sink);

        let sink = LogFileSink::open(&path).unwrap();
        sink.record(&StageResult::failure(id, 1, "B", "rate limited", 1));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("- INFO - Stage 1 (A) response: SUMMARY"));
        assert!(lines[1].ends_with("- ERROR - Stage 2 (B) failed: rate limited"));
    }

    #[test]
    fn open_fails_on_directory() {
        let dir = std::env::temp_dir().join(format!("relay-test-dir-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(LogFileSink::open(&dir).is_err());
    }
}
