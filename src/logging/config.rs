use std::{env, fmt, str::FromStr};

use msgbus_error::SettingsError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::Directive;

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Формат вывода событий.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(SettingsError::invalid(
                "logging.format",
                format!("unknown format '{other}'"),
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        };
        f.write_str(s)
    }
}

/// Настройки логирования.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Базовый уровень: trace, debug, info, warn, error или off.
    pub level: String,
    /// Дополнительные директивы `EnvFilter`, например `msgbus::bus=trace`.
    pub directives: Vec<String>,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directives: Vec::new(),
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_line_numbers: false,
        }
    }
}

impl LoggingConfig {
    /// Применяет `MSGBUS_LOG_LEVEL` и `MSGBUS_LOG_FORMAT`, если заданы.
    ///
    /// Некорректный формат не применяется, ошибку выдаст `validate`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("MSGBUS_LOG_LEVEL") {
            self.level = level.trim().to_ascii_lowercase();
        }
        if let Ok(format) = env::var("MSGBUS_LOG_FORMAT") {
            if let Ok(format) = format.parse() {
                self.format = format;
            }
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(SettingsError::invalid(
                "logging.level",
                format!("unknown level '{}'", self.level),
            ));
        }
        for directive in &self.directives {
            directive.parse::<Directive>().map_err(|e| {
                SettingsError::invalid("logging.directives", format!("'{directive}': {e}"))
            })?;
        }
        Ok(())
    }

    /// Строка для `EnvFilter`: уровень, затем директивы через запятую.
    pub fn build_filter_directive(&self) -> String {
        std::iter::once(self.level.as_str())
            .chain(self.directives.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    }
}
