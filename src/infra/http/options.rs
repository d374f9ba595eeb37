use reqwest::Method;
use serde::Serialize;

use super::error::ClientError;

/// Per-request settings for [`ApiClient::dispatch`](super::ApiClient::dispatch).
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    /// Pre-serialised body. A JSON content type is added unless one of
    /// `headers` already names a content type.
    pub body: Option<String>,
    pub query: Vec<(String, String)>,
    /// Attach the current access token.
    pub auth: bool,
    /// On 401, refresh once and resend.
    pub retry_on_unauthorized: bool,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
            query: Vec::new(),
            auth: true,
            retry_on_unauthorized: true,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialise `payload` as the request body.
    pub fn json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, ClientError> {
        let body = serde_json::to_string(payload).map_err(ClientError::Encode)?;
        Ok(self.with_body(body))
    }

    /// Send without a bearer token. Also disables refresh-and-retry, since a
    /// 401 on an anonymous request cannot be fixed by new tokens.
    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self.retry_on_unauthorized = false;
        self
    }

    pub fn without_retry(mut self) -> Self {
        self.retry_on_unauthorized = false;
        self
    }

    pub(crate) fn has_content_type(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}
