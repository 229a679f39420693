//! Логирование на базе `tracing-subscriber`.
//!
//! Шина сама только эмитит события `tracing`; этот модуль нужен
//! приложению, чтобы их увидеть.

pub mod config;
mod filters;
mod formatter;

pub use config::{LogFormat, LoggingConfig};
use msgbus_error::SettingsError;
use tracing_subscriber::{
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Устанавливает глобальный subscriber по конфигурации.
///
/// Повторный вызов не паникует, а возвращает `SettingsError::Logging`.
pub fn init_logging(mut config: LoggingConfig) -> Result<(), SettingsError> {
    config.apply_env_overrides();
    config.validate()?;

    let env_filter = filters::build_filter_from_config(&config);
    let fmt_layer =
        formatter::build_formatter_from_config::<Layered<EnvFilter, Registry>>(&config);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| SettingsError::Logging {
            reason: e.to_string(),
        })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        format = %config.format,
        "Logging system initialized"
    );

    Ok(())
}
