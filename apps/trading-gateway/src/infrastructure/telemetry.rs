//! Telemetry
//!
//! Structured logging via `tracing-subscriber`. `RUST_LOG` refines the
//! default `trading_gateway=info` directive.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default log directive for this crate.
pub const DEFAULT_DIRECTIVE: &str = "trading_gateway=info";

/// Initialize the global tracing subscriber.
///
/// Uses a static directive string that is guaranteed to parse.
#[allow(clippy::expect_used)]
pub fn init_tracing() {
    let env_filter = EnvFilter::from_default_env().add_directive(
        DEFAULT_DIRECTIVE
            .parse()
            .expect("static directive 'trading_gateway=info' is valid"),
    );

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_parses() {
        assert!(
            DEFAULT_DIRECTIVE
                .parse::<tracing_subscriber::filter::Directive>()
                .is_ok()
        );
    }
}
