//! Single-flight token refresh.
//!
//! Concurrent callers that hit an expired access token all await the same
//! refresh request. The in-flight operation lives in a mutex-guarded slot as
//! a [`Shared`] future; the slot is emptied when the operation completes, so
//! the next expiry starts a fresh refresh. Store updates (new tokens or a
//! full clear) happen inside the operation, before any waiter resumes.

use std::sync::{Arc, Mutex, PoisonError};

use bridgeus_api_types::{RefreshRequest, TokenResponse};
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use metrics::counter;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::application::credentials::CredentialStore;

use super::error::{ApiError, ClientError};

pub(crate) const METRIC_REFRESH: &str = "bridgeus_auth_refresh_total";
pub(crate) const METRIC_REFRESH_JOINED: &str = "bridgeus_auth_refresh_joined_total";
pub(crate) const METRIC_REFRESH_FAILED: &str = "bridgeus_auth_refresh_failed_total";

type InFlight = Shared<BoxFuture<'static, bool>>;

#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    url: String,
    store: CredentialStore,
    in_flight: Mutex<Option<InFlight>>,
}

impl RefreshCoordinator {
    pub fn new(http: Client, url: impl Into<String>, store: CredentialStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                url: url.into(),
                store,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Obtain a new token pair, joining an in-flight refresh if there is one.
    /// Returns `false` after clearing the credential store when no refresh
    /// token is held or the backend rejects it.
    pub async fn refresh(&self) -> bool {
        let operation = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            match slot.as_ref() {
                Some(existing) => {
                    counter!(METRIC_REFRESH_JOINED).increment(1);
                    debug!("joining in-flight token refresh");
                    existing.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let operation = async move {
                        let refreshed = inner.perform().await;
                        inner.release();
                        refreshed
                    }
                    .boxed()
                    .shared();
                    *slot = Some(operation.clone());
                    operation
                }
            }
        };

        operation.await
    }

    /// Whether a refresh is currently outstanding.
    pub fn in_flight(&self) -> bool {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Inner {
    async fn perform(&self) -> bool {
        let Some(refresh_token) = self.store.refresh_token() else {
            debug!("no refresh token held; clearing session");
            counter!(METRIC_REFRESH_FAILED).increment(1);
            self.store.clear();
            return false;
        };

        counter!(METRIC_REFRESH).increment(1);
        debug!(url = %self.url, "refreshing access token");

        match self.request(refresh_token).await {
            Ok(tokens) => {
                self.store.set(tokens.access_token, tokens.refresh_token);
                info!("access token refreshed");
                true
            }
            Err(err) => {
                counter!(METRIC_REFRESH_FAILED).increment(1);
                warn!(
                    target = "bridgeus::infra::http::refresh",
                    error = %err,
                    "token refresh failed; clearing session"
                );
                self.store.clear();
                false
            }
        }
    }

    async fn request(&self, refresh_token: String) -> Result<TokenResponse, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await.into());
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ClientError::Decode)
    }

    fn release(&self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
