use thiserror::Error;

/// Errors raised by the checked mutation functions.
///
/// The public mutation entry points never surface these: a stale reference
/// turns the operation into a no-op and is only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Node '{0}' not found in the graph")]
    NodeNotFound(String),

    #[error("Edge '{0}' not found in the graph")]
    EdgeNotFound(String),

    #[error("Node '{0}' is not a placeholder and cannot be promoted")]
    NotAPlaceholder(String),
}

/// Errors reported by external collaborators (persistence, preference store).
///
/// Callers always catch these and keep the in-memory state authoritative.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("No authenticated user is available")]
    Unauthenticated,

    #[error("Collaborator is unavailable: {0}")]
    Unavailable(String),

    #[error("Collaborator rejected the request: {0}")]
    Rejected(String),
}

/// Errors that can occur while loading or validating an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
