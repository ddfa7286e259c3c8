use thiserror::Error;

/// Errors raised while reading graph or config input.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("invalid config: {0}")]
    Config(#[from] json5::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("layout engine already registered: {0}")]
    DuplicateEngine(String),
}
