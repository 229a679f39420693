//! Общая для процесса шина по умолчанию.
//!
//! Для кода, которому удобнее статический `Messenger`, чем передача
//! `MessageBus` явно. Тесты и библиотеки должны создавать свои экземпляры.

use once_cell::sync::OnceCell;
use tracing::info;

use super::MessageBus;
use crate::config::BusConfig;

static MESSENGER: OnceCell<MessageBus> = OnceCell::new();

/// Возвращает общую шину, создавая её с настройками по умолчанию при первом
/// обращении.
pub fn messenger() -> &'static MessageBus {
    MESSENGER.get_or_init(MessageBus::new)
}

/// Создаёт общую шину с заданной конфигурацией.
///
/// Возвращает `false`, если шина уже создана (явно или через `messenger()`);
/// конфигурация в этом случае игнорируется.
pub fn init_messenger(config: BusConfig) -> bool {
    let policy = config.dispatch_policy;
    let installed = MESSENGER.set(MessageBus::with_config(config)).is_ok();
    if installed {
        info!(policy = %policy, "Global messenger initialized");
    }
    installed
}
