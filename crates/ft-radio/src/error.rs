use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RadioError {
    #[error("invalid radio parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}

pub type RadioResult<T> = Result<T, RadioError>;
