use bridgeus_api_types::ErrorBody;
use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Non-success response from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// Human-readable message; never empty.
    pub message: String,
    pub status: u16,
    /// Machine-readable error code, when the backend supplied one.
    pub code: Option<String>,
}

impl ApiError {
    /// Build from a status and whatever error envelope the body carried.
    /// Message precedence: `message`, then string `detail`, then the status
    /// reason phrase.
    pub fn from_parts(status: StatusCode, body: ErrorBody) -> Self {
        let message = body
            .human_message()
            .map(str::to_string)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

        Self {
            message,
            status: status.as_u16(),
            code: body.code,
        }
    }

    /// Consume an error response. Unreadable or non-JSON bodies fall back to
    /// the reason phrase.
    pub(crate) async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes).unwrap_or_default(),
            Err(err) => {
                tracing::debug!(status = status.as_u16(), error = %err, "failed to read error body");
                ErrorBody::default()
            }
        };
        Self::from_parts(status, body)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL `{url}`: {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid header `{name}`: {reason}")]
    Header { name: String, reason: String },
}

impl ClientError {
    /// HTTP status of a backend rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => Some(err.status),
            _ => None,
        }
    }

    pub fn header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Header {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_falls_back_to_reason_phrase() {
        let err = ApiError::from_parts(StatusCode::NOT_FOUND, ErrorBody::default());
        assert_eq!(err.message, "Not Found");
        assert_eq!(err.status, 404);
        assert!(err.code.is_none());
    }

    #[test]
    fn body_message_and_code_are_kept() {
        let body = ErrorBody {
            message: Some("Email already registered".into()),
            detail: None,
            code: Some("email_taken".into()),
        };
        let err = ApiError::from_parts(StatusCode::CONFLICT, body);
        assert_eq!(err.message, "Email already registered");
        assert_eq!(err.code.as_deref(), Some("email_taken"));
        assert_eq!(err.to_string(), "Email already registered (status 409)");
    }

    #[test]
    fn unknown_status_still_has_a_message() {
        let status = StatusCode::from_u16(599).expect("valid status");
        let err = ApiError::from_parts(status, ErrorBody::default());
        assert_eq!(err.message, "request failed with status 599");
    }

    #[test]
    fn only_api_errors_carry_status() {
        let err = ClientError::from(ApiError::from_parts(
            StatusCode::UNAUTHORIZED,
            ErrorBody::default(),
        ));
        assert_eq!(err.status(), Some(401));
        assert_eq!(ClientError::header("x", "bad").status(), None);
    }
}
