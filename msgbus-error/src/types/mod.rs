pub mod bus;
pub mod config;

// Публичный экспорт всех типов ошибок из вложенных модулей.
pub use bus::*;
pub use config::*;
