//! HTTP client for the BridgeUs REST API.

pub mod auth;
mod client;
mod error;
pub mod jwt;
mod options;
mod refresh;

pub use client::ApiClient;
pub use error::{ApiError, ClientError};
pub use options::RequestOptions;
pub use refresh::RefreshCoordinator;

pub(crate) use client::METRIC_HTTP_RETRY;
pub(crate) use refresh::{METRIC_REFRESH, METRIC_REFRESH_FAILED, METRIC_REFRESH_JOINED};
