use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, instrument, warn, Instrument};

use relay_core::{
    validate_stages, ConfigError, PipelineRun, Responder, ResultSink, Stage, StageResult,
};

use crate::handoff::build_conversation;

/// Runs a fixed chain of stages in order, feeding each stage's output into
/// the next and halting on the first responder failure.
pub struct PipelineRunner {
    stages: Vec<Stage>,
    responder: Arc<dyn Responder>,
    sink: Arc<dyn ResultSink>,
}

impl PipelineRunner {
    /// Validate the stage list up front. An invalid pipeline never reaches
    /// the responder or the sink.
    pub fn new(
        stages: Vec<Stage>,
        responder: Arc<dyn Responder>,
        sink: Arc<dyn ResultSink>,
    ) -> Result<Self, ConfigError> {
        validate_stages(&stages)?;
        Ok(Self {
            stages,
            responder,
            sink,
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Execute every stage against `seed_prompt`.
    ///
    /// A responder failure is recorded in the returned run and stops the
    /// chain; only configuration problems surface as `Err`. Dropping the
    /// future cancels the run between or during responder calls.
    #[instrument(
        skip(self, seed_prompt),
        fields(responder = self.responder.name(), model = self.responder.model(), stages = self.stages.len())
    )]
    pub async fn run(&self, seed_prompt: &str) -> Result<PipelineRun, ConfigError> {
        if seed_prompt.trim().is_empty() {
            return Err(ConfigError::EmptySeedPrompt);
        }

        let mut run = PipelineRun::new(self.stages.clone());
        let run_id = run.run_id().clone();
        info!(%run_id, "pipeline started");

        let mut prior_output = seed_prompt.to_string();
        let mut previous_stage: Option<&str> = None;

        for (index, stage) in self.stages.iter().enumerate() {
            let span = info_span!("stage", run_id = %run_id, stage = stage.name(), index);
            let result = self
                .execute_stage(&run, stage, index, &prior_output, previous_stage)
                .instrument(span.clone())
                .await;

            let succeeded = result.succeeded;
            span.in_scope(|| {
                self.sink.record(&result);
                if !succeeded {
                    warn!(
                        error = result.error.as_deref().unwrap_or_default(),
                        remaining = self.stages.len() - index - 1,
                        "pipeline halted"
                    );
                }
            });
            if succeeded {
                prior_output.clone_from(&result.output);
            }
            run.push_result(result);
            if !succeeded {
                break;
            }
            previous_stage = Some(stage.name());
        }

        run.finish();
        info!(%run_id, status = ?run.status(), "pipeline finished");
        Ok(run)
    }

    async fn execute_stage(
        &self,
        run: &PipelineRun,
        stage: &Stage,
        index: usize,
        prior_output: &str,
        previous_stage: Option<&str>,
    ) -> StageResult {
        let conversation = build_conversation(stage, index, prior_output, previous_stage);
        debug!(input_len = conversation[0].content.len(), "stage started");

        let started = Instant::now();
        let outcome = self
            .responder
            .respond(stage.instructions(), &conversation)
            .await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let run_id = run.run_id().clone();
        match outcome {
            Ok(output) => {
                info!(duration_ms, output_len = output.len(), "stage completed");
                StageResult::success(run_id, index, stage.name(), output, duration_ms)
            }
            Err(e) => StageResult::failure(run_id, index, stage.name(), e.message, duration_ms),
        }
    }
}

/// Build a runner for `stages` and execute it once against `seed_prompt`.
pub async fn run_pipeline(
    stages: Vec<Stage>,
    seed_prompt: &str,
    responder: Arc<dyn Responder>,
    sink: Arc<dyn ResultSink>,
) -> Result<PipelineRun, ConfigError> {
    PipelineRunner::new(stages, responder, sink)?
        .run(seed_prompt)
        .await
}
