use async_trait::async_trait;

use crate::errors::ResponderError;
use crate::messages::ConversationTurn;

/// The text-generation capability a pipeline stage calls into.
///
/// `role` carries the stage's behavioural instructions; `conversation` is the
/// turn list built for this one invocation. Implementations own their own
/// timeouts; the runner awaits each call to completion.
#[async_trait]
pub trait Responder: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    async fn respond(
        &self,
        role: &str,
        conversation: &[ConversationTurn],
    ) -> Result<String, ResponderError>;
}
