//! # relay
//!
//! Runs the configured stage chain once against the seed prompt and prints
//! each stage's response. Exit status: 0 when every stage succeeded, 1 when
//! the pipeline halted on a responder failure, 2 when configuration or
//! credentials were invalid and no stage ran.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use relay_core::{RunStatus, Stage};
use relay_engine::PipelineRunner;
use relay_llm::{OpenAiConfig, OpenAiResponder};
use relay_settings::{LoggingSettings, RelaySettings, ResponderSettings, SettingsError};
use relay_telemetry::{
    init_telemetry, parse_level, ConsoleSink, FanoutSink, LogFileSink, SqliteResultSink,
    TelemetryConfig, TracingSink,
};

/// Sequential multi-stage text-generation pipeline.
#[derive(Parser, Debug, Default)]
#[command(name = "relay", about = "Run a chain of text-generation stages")]
struct Cli {
    /// Settings file (defaults to `~/.relay/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed prompt for the first stage.
    #[arg(long)]
    prompt: Option<String>,

    /// Model name passed to the responder.
    #[arg(long)]
    model: Option<String>,

    /// Plain-text stage log.
    #[arg(long, conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Do not write the plain-text stage log.
    #[arg(long)]
    no_log_file: bool,

    /// SQLite database that records every stage result.
    #[arg(long)]
    results_db: Option<PathBuf>,

    /// Emit diagnostic logs as JSON lines.
    #[arg(long)]
    json_logs: bool,

    /// Print the merged settings as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Flags win over the file and the environment.
    fn apply_overrides(&self, settings: &mut RelaySettings) {
        if let Some(ref prompt) = self.prompt {
            settings.pipeline.seed_prompt.clone_from(prompt);
        }
        if let Some(ref model) = self.model {
            settings.responder.model.clone_from(model);
        }
        if let Some(ref path) = self.log_file {
            settings.logging.log_file = Some(path.display().to_string());
        }
        if let Some(ref path) = self.results_db {
            settings.logging.results_db = Some(path.display().to_string());
        }
        if self.no_log_file {
            settings.logging.log_file = None;
        }
        if self.json_logs {
            settings.logging.json = true;
        }
        settings.logging.clear_blank_paths();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.clone().unwrap_or_else(relay_settings::settings_path);
    // Validation waits for the flags, which may replace an unusable file value.
    let mut settings = relay_settings::load_file_layers(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    relay_settings::apply_env_overrides(&mut settings);
    cli.apply_overrides(&mut settings);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(ExitCode::SUCCESS);
    }

    let level = parse_level(&settings.logging.level);
    let _telemetry = init_telemetry(TelemetryConfig {
        log_level: level.unwrap_or(tracing::Level::INFO),
        json: settings.logging.json,
        ..TelemetryConfig::default()
    });
    if level.is_none() {
        tracing::warn!(level = %settings.logging.level, "unknown log level, using info");
    }
    tracing::debug!(path = %config_path.display(), "settings loaded");

    let stages = check_pipeline(&settings)?;
    let responder = OpenAiResponder::from_env(openai_config(&settings.responder))?;
    tracing::info!(endpoint = responder.endpoint(), model = %settings.responder.model, "responder ready");

    let sink = build_sinks(&settings.logging)?;
    let runner = PipelineRunner::new(stages, Arc::new(responder), Arc::new(sink))
        .context("invalid pipeline")?;
    let run = runner
        .run(&settings.pipeline.seed_prompt)
        .await
        .context("invalid pipeline")?;

    match run.status() {
        RunStatus::AllSucceeded => {
            if !settings.logging.console {
                if let Some(output) = run.final_output() {
                    println!("{output}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        RunStatus::Halted { .. } => Ok(ExitCode::from(1)),
        other => anyhow::bail!("run ended in unexpected state {other:?}"),
    }
}

/// Everything that can be rejected without side effects is rejected here,
/// before the credential lookup and before any sink touches the disk.
fn check_pipeline(settings: &RelaySettings) -> Result<Vec<Stage>> {
    if let Err(e) = settings.validate() {
        if let SettingsError::Pipeline(ref config) = e {
            tracing::error!(kind = config.error_kind(), error = %config, "invalid pipeline");
        }
        return Err(e.into());
    }
    settings.pipeline.build_stages().map_err(|e| {
        tracing::error!(kind = e.error_kind(), error = %e, "invalid pipeline");
        anyhow::Error::new(e).context("invalid pipeline")
    })
}

fn openai_config(settings: &ResponderSettings) -> OpenAiConfig {
    OpenAiConfig {
        model: settings.model.clone(),
        base_url: settings.base_url.clone(),
        api_key_env: settings.api_key_env.clone(),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
        request_timeout: Duration::from_secs(settings.timeout_secs),
    }
}

/// Console first, so a human sees the response before the durable sinks.
fn build_sinks(logging: &LoggingSettings) -> Result<FanoutSink> {
    let mut sinks = FanoutSink::new();
    if logging.console {
        sinks.push(Arc::new(ConsoleSink::stdout()));
    }
    sinks.push(Arc::new(TracingSink));

    if let Some(ref path) = logging.log_file {
        let sink = LogFileSink::open(path)
            .with_context(|| format!("failed to open log file: {path}"))?;
        sinks.push(Arc::new(sink));
    }
    if let Some(ref path) = logging.results_db {
        let sink = SqliteResultSink::open(Path::new(path))
            .with_context(|| format!("failed to open results database: {path}"))?;
        sinks.push(Arc::new(sink));
    }
    Ok(sinks)
}
