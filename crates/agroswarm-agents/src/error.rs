//! Error types for the agroswarm-agents crate.

use agroswarm_types::ParseActionError;
use agroswarm_world::WorldError;

/// Errors that can occur while acting on agents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// No agent exists at the given roster index.
    #[error("agent not found: {0}")]
    AgentNotFound(usize),

    /// An action name did not match any known action.
    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    /// The agent's cell could not be resolved.
    #[error("world error: {source}")]
    World {
        /// The underlying grid error.
        #[from]
        source: WorldError,
    },
}

impl From<ParseActionError> for AgentError {
    fn from(err: ParseActionError) -> Self {
        Self::UnknownAction(err.0)
    }
}
