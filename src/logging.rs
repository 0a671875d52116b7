//! Diagnostic logging to stderr
//!
//! `RUST_LOG` wins when set; otherwise only warnings are shown, or debug
//! output with `--verbose`. Progress output on stdout is not affected.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "flora_id=debug"
    } else {
        "flora_id=warn"
    }
}

/// Filter from a `RUST_LOG` value; blank or unparsable values fall back to
/// the default directive
pub fn env_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbose)))
}

pub fn init(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let _ = tracing_subscriber::registry()
        .with(env_filter(rust_log.as_deref(), verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "flora_id=warn");
        assert_eq!(default_directive(true), "flora_id=debug");
    }

    fn directives(rust_log: Option<&str>, verbose: bool) -> String {
        env_filter(rust_log, verbose).to_string().to_lowercase()
    }

    #[test]
    fn test_env_filter_defaults() {
        assert_eq!(directives(None, false), "flora_id=warn");
        assert_eq!(directives(None, true), "flora_id=debug");
        assert_eq!(directives(Some("  "), true), "flora_id=debug");
    }

    #[test]
    fn test_env_filter_prefers_rust_log() {
        let filter = directives(Some("reqwest=trace"), false);
        assert!(filter.contains("reqwest=trace"));
        assert!(!filter.contains("flora_id"));
    }

    #[test]
    fn test_env_filter_ignores_bad_rust_log() {
        assert_eq!(directives(Some("flora_id=loud"), true), "flora_id=debug");
    }
}
