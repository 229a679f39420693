use std::{any::Any, error::Error};

use crate::StatusCode;

/// Расширение для ошибок шины (object-safe).
///
/// Даёт единый способ получить статус-код, безопасное сообщение для
/// вызывающей стороны и теги для логов.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// По умолчанию [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Возвращает ошибку как [`Any`] для downcast к конкретному типу.
    fn as_any(&self) -> &dyn Any;

    /// Сообщение без внутренних деталей. Для внутренних ошибок это
    /// `"Internal error"`.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Internal => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Детализированное сообщение для логов (Debug-представление).
    fn log_message(&self) -> String {
        format!("{self:?}")
    }

    /// Пары ключ–значение для структурированных логов.
    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
        ]
    }

    /// Короткое имя типа ошибки, без пути модулей.
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string()
    }
}
