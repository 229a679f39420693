use std::{fmt, str::FromStr};

use msgbus_error::SettingsError;
use serde::{Deserialize, Serialize};

/// Верхняя граница для `initial_capacity`.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Что делать, если обработчик паникует во время `send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Остановиться на первом упавшем обработчике; остальные не вызываются.
    #[default]
    FailFast,
    /// Вызвать всех, а сбои вернуть одной агрегированной ошибкой.
    CollectAll,
}

impl DispatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::CollectAll => "collect_all",
        }
    }
}

impl fmt::Display for DispatchPolicy {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchPolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "collect_all" => Ok(Self::CollectAll),
            other => Err(SettingsError::invalid(
                "bus.dispatch_policy",
                format!("unknown policy '{other}', expected fail_fast or collect_all"),
            )),
        }
    }
}

/// Параметры `MessageBus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub dispatch_policy: DispatchPolicy,
    /// Начальная ёмкость реестра подписок.
    pub initial_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            dispatch_policy: DispatchPolicy::FailFast,
            initial_capacity: 16,
        }
    }
}

impl BusConfig {
    pub fn with_policy(
        mut self,
        policy: DispatchPolicy,
    ) -> Self {
        self.dispatch_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(SettingsError::invalid(
                "bus.initial_capacity",
                format!(
                    "{} exceeds the limit of {MAX_INITIAL_CAPACITY}",
                    self.initial_capacity
                ),
            ));
        }
        Ok(())
    }
}
