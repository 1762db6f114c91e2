use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Scrape error: {0}")]
    Scrape(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
