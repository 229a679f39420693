use std::path::Path;

use config::{Config, Environment, File};
use msgbus_error::SettingsError;
use serde::{Deserialize, Serialize};

use super::BusConfig;
use crate::logging::LoggingConfig;

/// Префикс переменных окружения, например `MSGBUS_BUS__DISPATCH_POLICY`.
pub const ENV_PREFIX: &str = "MSGBUS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bus: BusConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Значения по умолчанию, переопределённые переменными окружения.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(None)
    }

    /// Как [`Settings::load`], но с файлом между умолчаниями и окружением.
    /// Формат файла определяется по расширению.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        let defaults = Config::try_from(&Settings::default()).map_err(load_error)?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let cfg = builder
            // MSGBUS_BUS__DISPATCH_POLICY=collect_all
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(load_error)?;

        let settings: Settings = cfg.try_deserialize().map_err(load_error)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.bus.validate()?;
        self.logging.validate()
    }
}

fn load_error(err: config::ConfigError) -> SettingsError {
    SettingsError::Load {
        reason: err.to_string(),
    }
}
