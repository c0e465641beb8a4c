use thiserror::Error;

/// Failure inside a render backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The host cannot provide the requested rendering capability.
    #[error("rendering not supported: {0}")]
    Unsupported(String),
    /// A GPU/driver resource could not be created.
    #[error("resource allocation failed: {0}")]
    Allocation(String),
}

/// Failure of the scene lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// Missing 3D capability; fatal at start-up.
    #[error("3D rendering is not available: {0}")]
    Unsupported(String),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("scene has been torn down")]
    TornDown,
}

/// Failure of a topic lookup or parameter change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("unknown topic `{0}`")]
    UnknownTopic(String),
    #[error("topic `{topic}` has no parameter `{param}`")]
    UnknownParameter { topic: String, param: String },
    #[error("no topic is active")]
    NoActiveTopic,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
