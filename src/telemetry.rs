//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! - LOG_LEVEL controls the filter (e.g. "debug" or directives like
//!   "info,grade=debug,ipa_backend=debug,tower_http=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,ipa_backend=debug,catalogue=info,auth=info,grade=info,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses_and_covers_crate_targets() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        for target in ["ipa_backend", "catalogue", "auth", "grade"] {
            let directive = format!("{target}=");
            assert!(DEFAULT_FILTER.split(',').any(|d| d.starts_with(&directive)), "{target}");
        }
    }
}
