use thiserror::Error;

use crate::media::MediaError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Load superseded by a newer request")]
    Cancelled,
    #[error("HTTP {status}")]
    Http { status: u16 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unsupported response: {0}")]
    UnsupportedResponse(String),
    #[error("Invalid audio payload: {0}")]
    Decode(String),
    #[error(transparent)]
    Media(#[from] MediaError),
}

impl LoadError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => LoadError::Http {
                status: status.as_u16(),
            },
            None => LoadError::Network(e.to_string()),
        }
    }
}

impl From<reqwest_middleware::Error> for LoadError {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => LoadError::Network(format!("{e:#}")),
        }
    }
}
