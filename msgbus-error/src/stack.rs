use std::{fmt, panic::Location, sync::Arc};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{ErrorExt, LogLevel, StatusCode};

/// Ошибка с цепочкой контекстов.
///
/// Корневая ошибка хранится в `Arc`, поэтому `StackError` дёшево клонируется
/// и может передаваться между потоками.
#[derive(Clone)]
pub struct StackError {
    inner: Arc<dyn ErrorExt>,
    contexts: Arc<Vec<ErrorContext>>,
}

/// Один уровень контекста с местом вызова.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub message: String,
    pub location: Option<&'static Location<'static>>,
}

/// Сериализуемое представление ошибки (feature = "serde").
#[cfg(feature = "serde")]
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<String>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StackError {
    #[track_caller]
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            inner: Arc::new(err),
            contexts: Arc::new(Vec::new()),
        }
    }

    /// Добавляет контекст к ошибке.
    #[track_caller]
    pub fn context(
        mut self,
        msg: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.contexts).push(ErrorContext {
            message: msg.into(),
            location: Some(Location::caller()),
        });
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.inner.status_code()
    }

    pub fn client_message(&self) -> String {
        self.inner.client_message()
    }

    /// Корневая ошибка.
    pub fn root(&self) -> &dyn ErrorExt {
        self.inner.as_ref()
    }

    pub fn contexts(&self) -> &[ErrorContext] {
        &self.contexts
    }

    pub fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        self.inner.metrics_tags()
    }

    /// Попытка downcast к конкретному типу ошибки.
    pub fn downcast_ref<T: ErrorExt>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    #[cfg(feature = "serde")]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.status_code().code(),
            message: self.client_message(),
            #[cfg(debug_assertions)]
            contexts: Some(self.format_contexts()),
            #[cfg(not(debug_assertions))]
            contexts: None,
        }
    }

    fn format_contexts(&self) -> Vec<String> {
        self.contexts
            .iter()
            .map(|ctx| match ctx.location {
                Some(loc) => format!("{} ({}:{})", ctx.message, loc.file(), loc.line()),
                None => ctx.message.clone(),
            })
            .collect()
    }

    pub fn log_level(&self) -> LogLevel {
        self.status_code().log_level()
    }

    pub fn is_critical(&self) -> bool {
        self.status_code().is_critical()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StackError
////////////////////////////////////////////////////////////////////////////////

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut debug = f.debug_struct("StackError");
        debug.field("inner", &self.inner.to_string());
        debug.field("status_code", &self.status_code());

        if !self.contexts.is_empty() {
            debug.field("contexts", &self.format_contexts());
        }

        debug.finish()
    }
}

impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.contexts.is_empty() {
            return write!(f, "{}", self.inner);
        }
        let contexts: Vec<&str> = self.contexts.iter().map(|c| c.message.as_str()).collect();
        write!(f, "{}: {}", contexts.join(" → "), self.inner)
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl<E: ErrorExt> From<E> for StackError {
    #[track_caller]
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BusError;

    #[test]
    fn test_context_chain() {
        let err = BusError::InvalidArgument {
            reason: "handler is missing".to_string(),
        };
        let stack = StackError::new(err)
            .context("register Ping")
            .context("startup wiring");

        assert_eq!(stack.contexts().len(), 2);
        assert_eq!(stack.contexts()[0].message, "register Ping");
        assert!(stack.contexts()[0].location.is_some());
        assert_eq!(stack.status_code(), StatusCode::InvalidArgs);
    }

    #[test]
    fn test_downcast() {
        let stack = StackError::new(BusError::HandlerPanicked {
            message_type: "Ping",
            subscription: 4,
            reason: "boom".to_string(),
        });

        let down = stack.downcast_ref::<BusError>();
        assert!(matches!(
            down,
            Some(BusError::HandlerPanicked {
                subscription: 4,
                ..
            })
        ));
    }

    /// Тест проверяет, что `Display` содержит контексты и корневое сообщение.
    #[test]
    fn test_display() {
        let stack = StackError::new(BusError::InvalidArgument {
            reason: "handler is missing".to_string(),
        })
        .context("plugin init");

        let display = stack.to_string();
        assert!(display.starts_with("plugin init: "));
        assert!(display.contains("handler is missing"));
    }

    #[test]
    fn test_clone_keeps_contexts_independent() {
        let base = StackError::new(BusError::InvalidArgument {
            reason: "x".to_string(),
        });
        let a = base.clone().context("a");
        assert_eq!(base.contexts().len(), 0);
        assert_eq!(a.contexts().len(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialization() {
        let stack = StackError::new(BusError::InvalidArgument {
            reason: "handler is missing".to_string(),
        })
        .context("register");

        let response = stack.to_response();
        assert_eq!(response.code, StatusCode::InvalidArgs as u32);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("handler is missing"));
    }
}
