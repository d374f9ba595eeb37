use metrics::counter;
use reqwest::{
    Client, Response, StatusCode, Url,
    header::{CONTENT_TYPE, HeaderName, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    application::credentials::CredentialStore, config::ApiSettings, infra::error::InfraError,
};

use super::{
    error::{ApiError, ClientError},
    options::RequestOptions,
    refresh::RefreshCoordinator,
};

pub(crate) const METRIC_HTTP_RETRY: &str = "bridgeus_http_retry_total";

/// Authenticated JSON client for the BridgeUs API.
///
/// Every request reads the access token from the credential store at send
/// time. A 401 on an authenticated request triggers one shared refresh and,
/// if that succeeds, exactly one resend with the new token.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: CredentialStore,
    refresher: RefreshCoordinator,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, store: CredentialStore) -> Result<Self, InfraError> {
        let mut builder = Client::builder().user_agent(Self::user_agent());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|err| {
            InfraError::configuration(format!("failed to build http client: {err}"))
        })?;

        let base_url = settings.base_url.trim_end_matches('/').to_string();
        let refresher = RefreshCoordinator::new(
            http.clone(),
            format!("{base_url}{}", settings.refresh_path),
            store.clone(),
        );

        Ok(Self {
            http,
            base_url,
            store,
            refresher,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("bridgeus/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// Send a request to `base_url + path` and decode the JSON response.
    ///
    /// `204 No Content` and empty bodies decode from JSON `null`, so callers
    /// expecting nothing use `()` or `Option<_>`.
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let url = self.url(path, &options.query)?;
        let mut response = self.send(&url, &options).await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && options.auth
            && options.retry_on_unauthorized
            && self.refresher.refresh().await
        {
            counter!(METRIC_HTTP_RETRY).increment(1);
            debug!(method = %options.method, path, "resending request after token refresh");
            response = self.send(&url, &options).await?;
        }

        Self::handle(response).await
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|source| ClientError::Url {
            url: raw.clone(),
            source,
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send(&self, url: &Url, options: &RequestOptions) -> Result<Response, ClientError> {
        let mut request = self.http.request(options.method.clone(), url.clone());

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| ClientError::header(name.as_str(), err))?;
            let value =
                HeaderValue::from_str(value).map_err(|err| ClientError::header(name.as_str(), err))?;
            request = request.header(name, value);
        }

        if options.auth
            && let Some(token) = self.store.access_token()
        {
            request = request.bearer_auth(token);
        }

        if let Some(body) = options.body.as_ref() {
            if !options.has_content_type() {
                request = request.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            request = request.body(body.clone());
        }

        Ok(request.send().await?)
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let err = ApiError::from_response(response).await;
            debug!(status = err.status, code = ?err.code, message = %err.message, "request rejected");
            return Err(err.into());
        }

        let bytes = response.bytes().await?;
        if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            return serde_json::from_value(Value::Null).map_err(ClientError::Decode);
        }
        serde_json::from_slice(&bytes).map_err(ClientError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiSettings::new(base), CredentialStore::new()).expect("client")
    }

    #[test]
    fn urls_are_concatenated_not_resolved() {
        let client = client("https://api.example.com/api/");
        let url = client.url("/posts", &[]).expect("url");
        assert_eq!(url.as_str(), "https://api.example.com/api/posts");
    }

    #[test]
    fn query_pairs_are_encoded() {
        let client = client("https://api.example.com/api");
        let url = client
            .url("/search", &[("q".into(), "a b".into())])
            .expect("url");
        assert_eq!(url.as_str(), "https://api.example.com/api/search?q=a+b");
    }

    #[test]
    fn refresh_endpoint_follows_base_url() {
        let client = client("http://localhost:8000/api");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert!(!client.refresher().in_flight());
    }
}
