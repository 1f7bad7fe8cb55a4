pub mod auth;
pub mod converter;
pub mod openai;

pub mod mock;

pub use mock::{ScriptedReply, ScriptedResponder};
pub use openai::{OpenAiConfig, OpenAiResponder};
