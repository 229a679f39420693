//! Шина сообщений (publish–subscribe внутри процесса).
//!
//! - `messenger`: `MessageBus`, реестр подписок, регистрация, отписка и
//!   синхронная доставка.
//! - `receiver`: идентичность получателя (`Receiver`).
//! - `handler`: типобезопасный обработчик с идентичностью (`Handler<T>`).
//! - `subscription`: записи реестра и дескрипторы подписок.
//! - `stats`: счётчики активности.
//! - `global`: общая шина процесса.
//! - `intern` (приватный): пул имён получателей.

pub mod global;
pub mod handler;
mod intern;
pub mod messenger;
pub mod receiver;
pub mod stats;
pub mod subscription;

pub use global::{init_messenger, messenger};
pub use handler::Handler;
pub use messenger::MessageBus;
pub use receiver::Receiver;
pub use stats::{BusStats, BusStatsSnapshot};
pub(crate) use subscription::Subscription;
pub use subscription::{SubscriptionHandle, SubscriptionId};
