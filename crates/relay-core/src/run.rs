use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RunId;
use crate::stage::Stage;

/// Outcome of executing a single stage. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub run_id: RunId,
    pub stage_index: usize,
    pub stage_name: String,
    pub output: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl StageResult {
    pub fn success(
        run_id: RunId,
        stage_index: usize,
        stage_name: impl Into<String>,
        output: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            run_id,
            stage_index,
            stage_name: stage_name.into(),
            output: output.into(),
            succeeded: true,
            error: None,
            recorded_at: Utc::now(),
            duration_ms,
        }
    }

    /// A failed stage carries no output, only the error message.
    pub fn failure(
        run_id: RunId,
        stage_index: usize,
        stage_name: impl Into<String>,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            run_id,
            stage_index,
            stage_name: stage_name.into(),
            output: String::new(),
            succeeded: false,
            error: Some(error.into()),
            recorded_at: Utc::now(),
            duration_ms,
        }
    }
}

/// Where a run currently stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    NotStarted,
    Running { next_index: usize },
    AllSucceeded,
    Halted {
        index: usize,
        stage_name: String,
        error: String,
    },
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AllSucceeded | Self::Halted { .. })
    }
}

/// The ordered stages of a pipeline and the results produced so far.
///
/// `results` is always a prefix of `stages`: result `i` belongs to stage `i`,
/// and nothing is appended after a failed result.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineRun {
    run_id: RunId,
    stages: Vec<Stage>,
    results: Vec<StageResult>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            run_id: RunId::new(),
            stages,
            results: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Append the result for the next stage.
    ///
    /// Panics if the result does not belong to the next stage, or if the run
    /// already halted or completed.
    pub fn push_result(&mut self, result: StageResult) {
        let next = self.results.len();
        assert!(
            !self.is_halted() && next < self.stages.len(),
            "no stage left to record a result for"
        );
        assert_eq!(
            result.stage_name,
            self.stages[next].name(),
            "result recorded out of stage order"
        );
        self.results.push(result);
    }

    pub fn finish(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    pub fn is_halted(&self) -> bool {
        self.results.last().is_some_and(|r| !r.succeeded)
    }

    pub fn status(&self) -> RunStatus {
        match self.results.last() {
            None => RunStatus::NotStarted,
            Some(last) if !last.succeeded => RunStatus::Halted {
                index: self.results.len() - 1,
                stage_name: last.stage_name.clone(),
                error: last.error.clone().unwrap_or_default(),
            },
            Some(_) if self.results.len() == self.stages.len() => RunStatus::AllSucceeded,
            Some(_) => RunStatus::Running {
                next_index: self.results.len(),
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status() == RunStatus::AllSucceeded
    }

    /// The last stage's output, only when every stage succeeded.
    pub fn final_output(&self) -> Option<&str> {
        if self.succeeded() {
            self.results.last().map(|r| r.output.as_str())
        } else {
            None
        }
    }

    /// The failed result, if the run halted.
    pub fn failure(&self) -> Option<&StageResult> {
        self.results.last().filter(|r| !r.succeeded)
    }

    /// Outputs of every stage that succeeded, in order.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results
            .iter()
            .filter(|r| r.succeeded)
            .map(|r| (r.stage_name.as_str(), r.output.as_str()))
    }
}
