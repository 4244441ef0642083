use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const METRIC_COMMENTS_CREATED: &str = "pblog_comments_created_total";
pub const METRIC_COMMENTS_REJECTED: &str = "pblog_comments_rejected_total";
pub const METRIC_LOGIN_FAILURES: &str = "pblog_login_failures_total";
pub const METRIC_ERROR_RESPONSES: &str = "pblog_http_error_responses_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
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
            METRIC_COMMENTS_CREATED,
            Unit::Count,
            "Total number of reader comments stored."
        );
        describe_counter!(
            METRIC_COMMENTS_REJECTED,
            Unit::Count,
            "Total number of comment submissions that failed validation."
        );
        describe_counter!(
            METRIC_LOGIN_FAILURES,
            Unit::Count,
            "Total number of admin sign-in attempts with a wrong password."
        );
        describe_counter!(
            METRIC_ERROR_RESPONSES,
            Unit::Count,
            "Total number of HTTP responses with a 4xx or 5xx status."
        );
    });
}
