use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки загрузки настроек и инициализации логирования.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// Значение параметра не прошло валидацию.
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },

    /// Источник конфигурации не удалось прочитать или разобрать.
    #[error("Failed to load configuration: {reason}")]
    Load { reason: String },

    /// Глобальный subscriber уже установлен или не собрался.
    #[error("Failed to initialize logging: {reason}")]
    Logging { reason: String },
}

impl SettingsError {
    pub fn invalid(
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl ErrorExt for SettingsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid { .. } => StatusCode::InvalidConfig,
            Self::Load { .. } => StatusCode::ConfigLoad,
            Self::Logging { .. } => StatusCode::LoggingInit,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "settings".to_string()),
            ("status_code", self.status_code().to_string()),
        ];
        if let Self::Invalid { key, .. } = self {
            tags.push(("key", key.clone()));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value() {
        let err = SettingsError::invalid("logging.level", "unknown level 'loud'");
        assert_eq!(err.status_code(), StatusCode::InvalidConfig);
        assert_eq!(
            err.to_string(),
            "Invalid value for 'logging.level': unknown level 'loud'"
        );
        assert!(err
            .metrics_tags()
            .iter()
            .any(|(k, v)| *k == "key" && v == "logging.level"));
    }

    #[test]
    fn test_logging_is_critical() {
        let err = SettingsError::Logging {
            reason: "already set".to_string(),
        };
        assert!(crate::StackError::from(err).is_critical());
    }
}
