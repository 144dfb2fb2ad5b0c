use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid path input: {0}")]
    Input(#[from] serde_json::Error),
    #[error("invalid layer order: {0}")]
    LayerOrder(#[from] LayerOrderError),
    #[error("invalid config: {0}")]
    Config(#[from] json5::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerOrderError {
    #[error("expected {expected} layers, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("layer index {0} is out of range")]
    OutOfRange(usize),
    #[error("layer index {0} appears more than once")]
    Duplicate(usize),
    #[error("cannot parse layer index `{0}`")]
    Parse(String),
}
