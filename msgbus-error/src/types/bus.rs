use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Сбой одного обработчика при доставке сообщения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Идентификатор подписки, чей обработчик упал.
    pub subscription: u64,
    /// Текст паники, если его удалось извлечь.
    pub reason: String,
}

/// Ошибки шины сообщений.
#[derive(Debug, Clone, Error)]
pub enum BusError {
    /// Некорректный аргумент регистрации (например, отсутствует обработчик).
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Обработчик упал; доставка остальным подписчикам прервана.
    #[error("Handler of subscription #{subscription} for {message_type} panicked: {reason}")]
    HandlerPanicked {
        message_type: &'static str,
        subscription: u64,
        reason: String,
    },

    /// Один или несколько обработчиков упали; остальные получили сообщение.
    #[error(
        "{} of {} handler(s) for {message_type} failed",
        .failures.len(),
        .delivered + .failures.len()
    )]
    DispatchFailed {
        message_type: &'static str,
        delivered: usize,
        failures: Vec<HandlerFailure>,
    },
}

impl BusError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Все сбои обработчиков, содержащиеся в ошибке.
    pub fn failures(&self) -> Vec<HandlerFailure> {
        match self {
            Self::InvalidArgument { .. } => Vec::new(),
            Self::HandlerPanicked {
                subscription,
                reason,
                ..
            } => vec![HandlerFailure {
                subscription: *subscription,
                reason: reason.clone(),
            }],
            Self::DispatchFailed { failures, .. } => failures.clone(),
        }
    }
}

impl ErrorExt for BusError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::InvalidArgs,
            Self::HandlerPanicked { .. } => StatusCode::HandlerPanicked,
            Self::DispatchFailed { .. } => StatusCode::DispatchFailed,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::InvalidArgument { reason } => format!("Invalid argument: {reason}"),
            Self::HandlerPanicked { message_type, .. } => {
                format!("A handler for {message_type} failed")
            }
            Self::DispatchFailed {
                message_type,
                failures,
                ..
            } => format!("{} handler(s) for {message_type} failed", failures.len()),
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "bus".to_string()),
            ("status_code", self.status_code().to_string()),
        ];

        match self {
            Self::HandlerPanicked {
                message_type,
                subscription,
                ..
            } => {
                tags.push(("message_type", message_type.to_string()));
                tags.push(("subscription", subscription.to_string()));
            }
            Self::DispatchFailed {
                message_type,
                failures,
                ..
            } => {
                tags.push(("message_type", message_type.to_string()));
                tags.push(("failed_handlers", failures.len().to_string()));
            }
            Self::InvalidArgument { .. } => {}
        }

        tags
    }
}
