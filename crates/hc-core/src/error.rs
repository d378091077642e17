use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Arena index {index} does not fit in a handle")]
    IndexOverflow { index: usize },

    #[error("Invalid time of day '{text}': {reason}")]
    InvalidTime { text: String, reason: &'static str },
}
