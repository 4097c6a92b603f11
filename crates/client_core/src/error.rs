use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid countries API base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request to countries API failed: {0}")]
    Transport(String),
    #[error("countries API responded with status {0}")]
    Status(u16),
    #[error("countries API response was not a list of country objects: {0}")]
    Decode(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else if error.is_decode() {
            FetchError::Decode(error.to_string())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}
