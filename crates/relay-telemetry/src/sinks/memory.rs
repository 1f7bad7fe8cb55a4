use parking_lot::Mutex;
use relay_core::{ResultSink, StageResult};

/// Keeps every result it receives, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Mutex<Vec<StageResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> Vec<StageResult> {
        self.results.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}

impl ResultSink for MemorySink {
    fn record(&self, result: &StageResult) {
        self.results.lock().push(result.clone());
    }
}
