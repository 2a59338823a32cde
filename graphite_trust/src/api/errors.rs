use thiserror::Error;

/// Failures surfaced by the explorer client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("config error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {status} body={body}")]
    HttpStatus { status: u16, body: String },
    /// The envelope came back, but not with `status == "1"` and a `result`.
    #[error("invalid response format from API ({operation}): status={status} message={message}")]
    Envelope {
        operation: &'static str,
        status: String,
        message: String,
    },
    #[error("decode error ({operation}): {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },
}

impl ClientError {
    /// True for failures of the HTTP exchange itself, as opposed to a reply
    /// that arrived but could not be used.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::HttpStatus { .. })
    }

    pub(crate) fn envelope(operation: &'static str, status: &str, message: &str) -> Self {
        ClientError::Envelope {
            operation,
            status: status.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn decode(operation: &'static str, reason: impl ToString) -> Self {
        ClientError::Decode {
            operation,
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            return ClientError::Decode {
                operation: "response",
                reason: err.to_string(),
            };
        }
        ClientError::Network(err.to_string())
    }
}
