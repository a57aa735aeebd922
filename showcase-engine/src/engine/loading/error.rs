use thiserror::Error;

/// Failures of a load session. All of them are fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("resource manifest lists no resources")]
    EmptyManifest,
    #[error("resource manifest lists '{0}' more than once")]
    DuplicateName(String),
    #[error("no resource at manifest index {0}")]
    UnknownResource(usize),
    #[error("failed to load '{name}': {reason}")]
    ResourceFailed { name: String, reason: String },
    #[error("load session already failed")]
    SessionFailed,
}
