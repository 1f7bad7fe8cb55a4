use relay_core::{ResultSink, StageResult};
use tracing::{error, info};

/// Emits one structured `tracing` event per stage result.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn record(&self, result: &StageResult) {
        if result.succeeded {
            info!(
                run_id = %result.run_id,
                stage = %result.stage_name,
                index = result.stage_index,
                duration_ms = result.duration_ms,
                output_chars = result.output.len(),
                "stage response recorded"
            );
        } else {
            error!(
                run_id = %result.run_id,
                stage = %result.stage_name,
                index = result.stage_index,
                duration_ms = result.duration_ms,
                error = result.error.as_deref().unwrap_or(""),
                "stage failed"
            );
        }
    }
}
