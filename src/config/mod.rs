//! Конфигурация шины и логирования.
//!
//! - `bus`: политика доставки и параметры реестра.
//! - `settings`: загрузка всех секций через crate `config` (значения по
//!   умолчанию, TOML-файл, переменные окружения `MSGBUS_*`).

pub mod bus;
pub mod settings;

pub use bus::{BusConfig, DispatchPolicy};
pub use settings::Settings;
