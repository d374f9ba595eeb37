use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{
    application::render::METRIC_SANITIZE_FALLBACK,
    config::{LogFormat, LoggingSettings},
};

use super::{
    error::InfraError,
    http::{METRIC_HTTP_RETRY, METRIC_REFRESH, METRIC_REFRESH_FAILED, METRIC_REFRESH_JOINED},
};

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
/// Output goes to stderr so command results on stdout stay machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_REFRESH,
            Unit::Count,
            "Total number of token refresh requests sent to the backend."
        );
        describe_counter!(
            METRIC_REFRESH_JOINED,
            Unit::Count,
            "Total number of refresh callers that joined an in-flight refresh."
        );
        describe_counter!(
            METRIC_REFRESH_FAILED,
            Unit::Count,
            "Total number of refresh attempts that ended in sign-out."
        );
        describe_counter!(
            METRIC_HTTP_RETRY,
            Unit::Count,
            "Total number of requests re-sent after a successful refresh."
        );
        describe_counter!(
            METRIC_SANITIZE_FALLBACK,
            Unit::Count,
            "Total number of HTML renders that fell back to unsanitised input."
        );
    });
}
