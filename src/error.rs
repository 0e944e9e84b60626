use thiserror::Error;

/// Failures that stop the container manager or its settings from being set
/// up at all.
///
/// Individual backend calls never surface as errors; they are logged and
/// reported as `false` or an empty listing.
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("missing required tools: {}", .0.join(", "))]
    MissingDependency(Vec<String>),

    /// The settings directory or file could not be prepared
    #[error(transparent)]
    Config(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ManagerError>;
