//! Error Types for Scholar Search

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScholarError>;

#[derive(Error, Debug)]
pub enum ScholarError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("Failed to search Google Scholar: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to search Google Scholar: HTTP {0}")]
    Http(u16),

    #[error("Invalid search URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid result selector {0}")]
    Selector(String),
}

impl ScholarError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }
}
