//! # relay-engine
//!
//! Runs a linear chain of [`Stage`](relay_core::Stage)s against a
//! [`Responder`](relay_core::Responder). Stage `i + 1` receives the output
//! of stage `i` through a handoff template, every result goes to a
//! [`ResultSink`](relay_core::ResultSink), and the first failure halts the
//! chain.

pub mod handoff;
pub mod runner;

pub use handoff::build_conversation;
pub use runner::{run_pipeline, PipelineRunner};
