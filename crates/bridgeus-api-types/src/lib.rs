//! Wire types for the BridgeUs REST API.
//!
//! These mirror the JSON bodies exchanged with the `/auth/*` endpoints and the
//! generic error envelope every endpoint returns on failure. They carry no
//! behaviour; the client crate owns all request logic.

use serde::{Deserialize, Serialize};

/// Access/refresh pair returned by `/auth/login`, `/auth/register` and `/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub code: String,
}

/// What an emailed verification code will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePurpose {
    Register,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailCodeRequest {
    pub email: String,
    pub purpose: CodePurpose,
}

/// `code` is only echoed back by servers running with debug email delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailCodeResponse {
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Subset of `/profiles/me` the client keeps on the signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub language_preference: Option<String>,
}

/// Error envelope. Every field is optional because proxies and framework
/// defaults do not always produce the application's own shape; `detail` may be
/// a structured validation report rather than a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Human-readable message: non-empty `message` first, then a non-empty
    /// string `detail`.
    pub fn human_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|message| !message.is_empty())
            .or_else(|| {
                self.detail
                    .as_ref()
                    .and_then(serde_json::Value::as_str)
                    .filter(|detail| !detail.is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_takes_precedence_over_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"bad","detail":"worse","code":"x"}"#)
                .expect("error body");
        assert_eq!(body.human_message(), Some("bad"));
        assert_eq!(body.code.as_deref(), Some("x"));
    }

    #[test]
    fn empty_message_falls_back_to_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"","detail":"Not authenticated"}"#)
                .expect("error body");
        assert_eq!(body.human_message(), Some("Not authenticated"));
    }

    #[test]
    fn structured_detail_is_not_a_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":[{"loc":["body","email"],"msg":"invalid"}]}"#)
                .expect("error body");
        assert_eq!(body.human_message(), None);
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        let tokens: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#)
                .expect("token response");
        assert_eq!(tokens.token_type, "bearer");
    }

    #[test]
    fn code_purpose_serialises_snake_case() {
        let request = SendEmailCodeRequest {
            email: "a@example.com".into(),
            purpose: CodePurpose::Reset,
        };
        let json = serde_json::to_value(&request).expect("serialise");
        assert_eq!(json["purpose"], "reset");
    }
}
