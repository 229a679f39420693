use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок шины сообщений.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 3xxx: Доставка сообщений (dispatch)
/// - 4xxx: Конфигурация и логирование
///
/// `num_enum::TryFromPrimitive` даёт `TryFrom<u32>`; `strum` и `serde_repr`
/// подключаются опционально через feature `extras`.
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Internal = 1001,
    InvalidArgs = 1002,

    // === 3xxx: Доставка ===
    HandlerPanicked = 3000,
    DispatchFailed = 3001,

    // === 4xxx: Конфигурация ===
    InvalidConfig = 4000,
    ConfigLoad = 4001,
    LoggingInit = 4002,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Требуется ли логировать как критическую ошибку.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Internal | Self::LoggingInit)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Trace,
            Self::InvalidArgs | Self::InvalidConfig => LogLevel::Info,
            Self::HandlerPanicked | Self::DispatchFailed | Self::ConfigLoad => LogLevel::Warn,
            Self::Internal | Self::LoggingInit => LogLevel::Error,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет конвертацию через `TryFrom<u32>`.
    #[test]
    fn test_try_from_u32() {
        let n = StatusCode::HandlerPanicked.code();
        assert_eq!(n, 3000);
        assert_eq!(
            StatusCode::try_from(n).unwrap(),
            StatusCode::HandlerPanicked
        );
        assert!(StatusCode::try_from(2000).is_err());

        let raw: u32 = StatusCode::LoggingInit.into();
        assert_eq!(raw, 4002);
    }

    /// Тест проверяет уровни логирования для разных кодов.
    #[test]
    fn test_log_level_mappings() {
        assert_eq!(StatusCode::Success.log_level(), LogLevel::Trace);
        assert_eq!(StatusCode::InvalidConfig.log_level(), LogLevel::Info);
        assert_eq!(StatusCode::HandlerPanicked.log_level(), LogLevel::Warn);
        assert_eq!(StatusCode::Internal.log_level(), LogLevel::Error);
        assert!(StatusCode::Internal.is_critical());
        assert!(!StatusCode::DispatchFailed.is_critical());
    }

    /// Тест проверяет формат `Display`: имя варианта и числовой код.
    #[test]
    fn test_display_contains_name_and_code() {
        let s = format!("{}", StatusCode::DispatchFailed);
        assert!(s.contains("3001"), "got: {s}");
        assert!(s.contains("DispatchFailed"), "got: {s}");
    }
}
