use shared::error::ProtocolError;
use thiserror::Error;

/// Every way a page fetch can fail. Reported to observers as a `FetchFailed` event.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid collection url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server responded with status {status}")]
    Status { status: u16 },
    #[error("malformed response body: {0}")]
    Decode(#[from] ProtocolError),
    #[error("response body is not valid JSON: {0}")]
    Body(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            FetchError::Body(err)
        } else {
            FetchError::Transport(err)
        }
    }
}
