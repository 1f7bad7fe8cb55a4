use std::sync::Arc;

use crate::run::StageResult;

/// Receives every stage result, successful or not, as the run progresses.
///
/// `record` must not panic. Sinks that can fail (files, databases) swallow
/// their own errors.
pub trait ResultSink: Send + Sync {
    fn record(&self, result: &StageResult);
}

impl<S: ResultSink + ?Sized> ResultSink for Arc<S> {
    fn record(&self, result: &StageResult) {
        (**self).record(result)
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn record(&self, result: &StageResult) {
        (**self).record(result)
    }
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn record(&self, _result: &StageResult) {}
}
