//! The external chat collaborator seam.
//!
//! Each user turn is one request/response call. Implementations must not retry;
//! failures are reported back to the session as a displayable message.

use async_trait::async_trait;

use crate::context::Context;
use crate::error::CollaboratorError;
use crate::parser::RawGroundingChunk;
use crate::transcript::ChatMessage;

/// Everything the collaborator needs for one turn
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub context: Context,
    /// Prior user and model turns, oldest first
    pub history: Vec<ChatMessage>,
    pub query: String,
}

/// Unparsed reply: free text plus grounding chunks
#[derive(Debug, Clone, Default)]
pub struct CollaboratorReply {
    pub text: String,
    pub grounding: Vec<RawGroundingChunk>,
}

#[async_trait]
pub trait ChatCollaborator: Send + Sync {
    async fn send(&self, request: TurnRequest) -> Result<CollaboratorReply, CollaboratorError>;

    /// Whether a credential is available; requests fail fast without one
    fn is_configured(&self) -> bool;
}
