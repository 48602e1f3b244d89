use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("malformed SAE number {value:?}: {reason}")]
    MalformedSaeNumber { value: String, reason: &'static str },
    #[error("SAE sequence must be between 1 and 99, got {0}")]
    InvalidSequence(u32),
    #[error("study number must not be blank")]
    BlankStudyNumber,
}

pub type Result<T> = std::result::Result<T, ModelError>;
