use thiserror::Error;

pub type Result<T> = std::result::Result<T, OverpassError>;

#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for OverpassError {
    fn from(err: reqwest::Error) -> Self {
        OverpassError::Network(err.to_string())
    }
}
