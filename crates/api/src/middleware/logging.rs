//! Logging initialization and configuration.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Maps the configured `span_events` value onto tracing's span event mask.
///
/// Unknown values fall back to `close`, which keeps span timings in the
/// output without doubling the line count the way `full` does.
fn span_events(value: &str) -> FmtSpan {
    match value {
        "none" => FmtSpan::NONE,
        "full" => FmtSpan::FULL,
        _ => FmtSpan::CLOSE,
    }
}

/// Initializes the logging subsystem based on configuration.
///
/// `RUST_LOG` wins over the configured level when set. The output format
/// (`json` or `pretty`) and span event verbosity both come from config so
/// deployments can tune them without a rebuild.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let events = span_events(&config.span_events);

    match config.format.as_str() {
        "json" => {
            let json_layer = fmt::layer()
                .json()
                .with_span_events(events)
                .with_current_span(true)
                .with_target(true);
            subscriber.with(json_layer).init();
        }
        _ => {
            let pretty_layer = fmt::layer()
                .pretty()
                .with_span_events(events)
                .with_target(true);
            subscriber.with(pretty_layer).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(value: &str) -> String {
        format!("{:?}", span_events(value))
    }

    #[test]
    fn test_span_events_known_values() {
        assert_eq!(mask("none"), format!("{:?}", FmtSpan::NONE));
        assert_eq!(mask("close"), format!("{:?}", FmtSpan::CLOSE));
        assert_eq!(mask("full"), format!("{:?}", FmtSpan::FULL));
    }

    #[test]
    fn test_span_events_unknown_value_falls_back_to_close() {
        assert_eq!(mask("verbose"), format!("{:?}", FmtSpan::CLOSE));
        assert_eq!(mask(""), format!("{:?}", FmtSpan::CLOSE));
    }
}
