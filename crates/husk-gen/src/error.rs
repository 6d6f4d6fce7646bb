//! Generation error types.

use std::path::PathBuf;

/// Errors that can occur while generating stubs for one root.
///
/// Member-level introspection failures are not represented here: they
/// degrade to placeholder declarations inside the output (see
/// [`crate::emit::StubEmitter`]) and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// The requested root name does not resolve to a module
    #[error("root '{0}' not found in object graph")]
    RootNotFound(String),

    /// Generated text could not be persisted
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Errors surfaced by persistence sinks.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Underlying I/O failure, unmodified
    #[error("cannot persist '{root}': {source}")]
    Io {
        /// Root whose output failed to persist
        root: String,
        /// The I/O error as reported by the platform
        #[source]
        source: std::io::Error,
    },

    /// The root name would escape the output directory
    #[error("root name '{0}' is not a valid artifact name")]
    InvalidName(String),

    /// The configured output location is unusable
    #[error("output path '{0}' is not a directory")]
    NotADirectory(PathBuf),
}
