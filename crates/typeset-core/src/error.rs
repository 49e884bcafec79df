use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid locale '{0}': expected a form like 'de', 'de_DE' or 'de-DE-formal'")]
    InvalidLocale(String),
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
    #[error("Invalid link prefix: {0:?}")]
    InvalidPrefix(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
