use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid name prefix: {0}")]
    InvalidNamePrefix(String),
}
