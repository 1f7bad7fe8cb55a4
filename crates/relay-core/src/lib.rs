pub mod errors;
pub mod ids;
pub mod messages;
pub mod responder;
pub mod run;
pub mod security;
pub mod sink;
pub mod stage;

pub use errors::{ConfigError, MissingCredentialError, ResponderError};
pub use ids::RunId;
pub use messages::{ConversationTurn, Role};
pub use responder::Responder;
pub use run::{PipelineRun, RunStatus, StageResult};
pub use sink::{NullSink, ResultSink};
pub use stage::{validate_stages, Stage, StageSpec};
