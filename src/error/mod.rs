//! Ошибки шины. Сами типы живут в crate `msgbus-error`.

pub use msgbus_error::{
    BusError, ErrorExt, HandlerFailure, LogLevel, MsgbusResult, ResultExt, SettingsError,
    StackError, StatusCode,
};

/// Результат операций доставки.
pub type BusResult<T> = Result<T, BusError>;
