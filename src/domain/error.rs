use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Required field missing: {0}")]
    MissingField(String),

    #[error("Invalid page number: {0}")]
    InvalidPage(usize),
}

pub type DomainResult<T> = Result<T, DomainError>;
