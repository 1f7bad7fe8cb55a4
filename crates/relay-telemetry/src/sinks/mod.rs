//! [`ResultSink`](relay_core::ResultSink) implementations.
//!
//! Sinks that touch the outside world (files, databases, stdout) never
//! propagate errors out of `record`; failures are reported through `tracing`
//! and the run continues.

mod console;
mod fanout;
mod log_file;
mod memory;
mod sqlite;
mod tracing_sink;

pub use console::{display_name, ConsoleSink};
pub use fanout::FanoutSink;
pub use log_file::{format_line, LogFileSink};
pub use memory::MemorySink;
pub use sqlite::{SqliteResultSink, StoredResult};
pub use tracing_sink::TracingSink;
