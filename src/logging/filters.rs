use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// Собирает `EnvFilter`: `RUST_LOG`, если задана, иначе директива из
/// конфигурации, иначе `info`.
pub(crate) fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    if let Ok(env_filter) = EnvFilter::try_from_default_env() {
        return env_filter;
    }

    let directive = config.build_filter_directive();
    EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter directive '{directive}': {e}; falling back to 'info'");
        EnvFilter::new("info")
    })
}
