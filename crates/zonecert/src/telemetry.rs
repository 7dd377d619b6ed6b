use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Failures while installing the tracing stack.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Filter used when `RUST_LOG` is unset: the configured level for this
/// service, with hyper and tower internals pinned to warn.
fn fallback_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = format!("{log_level},hyper=warn,tower=warn");
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
        value: log_level.to_string(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => fallback_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_builds_a_filter() {
        assert!(fallback_filter("debug").is_ok());
    }

    #[test]
    fn malformed_filter_directive_is_rejected_with_the_offending_value() {
        match fallback_filter("not==a==filter") {
            Err(TelemetryError::EnvFilter { value, .. }) => assert_eq!(value, "not==a==filter"),
            other => panic!("expected filter rejection, got {other:?}"),
        }
    }
}
