use thiserror::Error;

/// The one way a weather request can fail.
///
/// Connectivity problems, error statuses and unparseable bodies all end up
/// here; only the message tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestFailed {
    message: String,
}

impl RequestFailed {
    pub fn new(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "Weather request failed".to_string();
        }
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The request URL carries the API key, so it is stripped from the message.
impl From<reqwest::Error> for RequestFailed {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        RequestFailed::new(format!("Failed to reach weather provider: {err}"))
    }
}
