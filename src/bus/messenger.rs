use std::{
    any::{type_name, Any},
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use msgbus_error::{BusError, HandlerFailure};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::{
    BusStats, BusStatsSnapshot, Handler, Receiver, Subscription, SubscriptionHandle,
    SubscriptionId,
};
use super::intern::release_names;
use crate::config::{bus::MAX_INITIAL_CAPACITY, BusConfig, DispatchPolicy, Settings};

/// Типизированная шина сообщений с подписками, привязанными к получателям.
///
/// Реестр: упорядоченный по времени регистрации список подписок под
/// `parking_lot::Mutex`. Блокировка держится только на время изменения
/// реестра или снятия снимка; обработчики вызываются без неё, поэтому из
/// обработчика можно регистрироваться, отписываться и отправлять сообщения
/// в ту же шину.
///
/// Сопоставление по типу точное: подписка на `T` получает только `send::<T>`.
pub struct MessageBus {
    registry: Mutex<Vec<Arc<Subscription>>>,
    next_id: AtomicU64,
    policy: DispatchPolicy,
    stats: BusStats,
}

impl MessageBus {
    /// Пустая шина с настройками по умолчанию (`FailFast`).
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Пустая шина с заданной политикой и начальной ёмкостью реестра.
    ///
    /// Ёмкость больше [`MAX_INITIAL_CAPACITY`] урезается до предела.
    pub fn with_config(config: BusConfig) -> Self {
        let capacity = if config.initial_capacity > MAX_INITIAL_CAPACITY {
            warn!(
                requested = config.initial_capacity,
                limit = MAX_INITIAL_CAPACITY,
                "Initial capacity clamped"
            );
            MAX_INITIAL_CAPACITY
        } else {
            config.initial_capacity
        };

        Self {
            registry: Mutex::new(Vec::with_capacity(capacity)),
            next_id: AtomicU64::new(1),
            policy: config.dispatch_policy,
            stats: BusStats::new(),
        }
    }

    /// Шина из секции `bus` загруженных [`Settings`].
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_config(settings.bus.clone())
    }

    /// Политика, применяемая при панике обработчика.
    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    ////////////////////////////////////////////////////////////////////////////
    // Регистрация
    ////////////////////////////////////////////////////////////////////////////

    /// Подписывает замыкание на сообщения типа `T` от имени `receiver`.
    pub fn register<T, F>(
        &self,
        receiver: impl Into<Receiver>,
        handler: F,
    ) -> SubscriptionHandle
    where
        T: 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.insert(receiver.into(), Handler::new(handler))
    }

    /// То же, что `register` с `Receiver::Global`.
    pub fn register_global<T, F>(
        &self,
        handler: F,
    ) -> SubscriptionHandle
    where
        T: 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.insert(Receiver::Global, Handler::new(handler))
    }

    /// Регистрирует готовый [`Handler`], сохраняя его идентичность для
    /// последующего `unregister_handler`.
    ///
    /// Возвращает `BusError::InvalidArgument`, если обработчик не передан.
    pub fn register_handler<T: 'static>(
        &self,
        receiver: impl Into<Receiver>,
        handler: impl Into<Option<Handler<T>>>,
    ) -> Result<SubscriptionHandle, BusError> {
        let Some(handler) = handler.into() else {
            return Err(BusError::invalid_argument(format!(
                "handler for {} is missing",
                type_name::<T>()
            )));
        };
        Ok(self.insert(receiver.into(), handler))
    }

    fn insert<T: 'static>(
        &self,
        receiver: Receiver,
        handler: Handler<T>,
    ) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let subscription = Arc::new(Subscription::new(id, receiver, handler));
        let handle = subscription.handle();

        let total = {
            let mut registry = self.registry.lock();
            registry.push(subscription);
            registry.len()
        };
        self.stats.record_registered();

        debug!(
            subscription = %id,
            receiver = %handle.receiver(),
            message_type = handle.message_type(),
            total,
            "Handler registered"
        );
        handle
    }

    ////////////////////////////////////////////////////////////////////////////
    // Отписка
    ////////////////////////////////////////////////////////////////////////////

    /// Снимает ровно одну подписку. `false`, если её уже нет.
    pub fn unsubscribe(
        &self,
        handle: &SubscriptionHandle,
    ) -> bool {
        let id = handle.id();
        let detached = self.detach_where(|s| s.id == id);
        self.release("unsubscribe", Receiver::Global, detached) > 0
    }

    /// Снимает все подписки без получателя.
    pub fn unregister_global(&self) -> usize {
        let detached = self.detach_where(|s| s.receiver.is_global());
        self.release("unregister_global", Receiver::Global, detached)
    }

    /// Снимает все подписки получателя, любого типа.
    pub fn unregister(
        &self,
        receiver: impl Into<Receiver>,
    ) -> usize {
        let receiver = receiver.into();
        let detached = self.detach_where(|s| s.receiver == receiver);
        self.release("unregister", receiver, detached)
    }

    /// Снимает все подписки на тип `T`, независимо от получателя.
    pub fn unregister_type<T: 'static>(&self) -> usize {
        let detached = self.detach_where(|s| s.accepts::<T>());
        self.release("unregister_type", Receiver::Global, detached)
    }

    /// Снимает подписки на `T` конкретного получателя.
    pub fn unregister_type_for<T: 'static>(
        &self,
        receiver: impl Into<Receiver>,
    ) -> usize {
        let receiver = receiver.into();
        let detached = self.detach_where(|s| s.accepts::<T>() && s.receiver == receiver);
        self.release("unregister_type_for", receiver, detached)
    }

    /// Снимает подписки на `T`, хранящие этот же `Handler` (по идентичности).
    pub fn unregister_handler<T: 'static>(
        &self,
        handler: &Handler<T>,
    ) -> usize {
        let detached = self.detach_where(|s| s.holds(handler));
        self.release("unregister_handler", Receiver::Global, detached)
    }

    /// Снимает подписки, совпадающие по получателю, типу и обработчику.
    pub fn unregister_handler_for<T: 'static>(
        &self,
        receiver: impl Into<Receiver>,
        handler: &Handler<T>,
    ) -> usize {
        let receiver = receiver.into();
        let detached = self.detach_where(|s| s.receiver == receiver && s.holds(handler));
        self.release("unregister_handler_for", receiver, detached)
    }

    /// Удаляет все подписки.
    pub fn clear(&self) -> usize {
        let detached = self.detach_where(|_| true);
        self.release("clear", Receiver::Global, detached)
    }

    /// Вынимает совпавшие подписки из реестра; порядок оставшихся
    /// сохраняется. Возвращает вынутые подписки и размер реестра после.
    ///
    /// Под блокировкой подписки только перекладываются: ни один обработчик
    /// или объект получателя здесь не освобождается.
    fn detach_where<P>(
        &self,
        mut predicate: P,
    ) -> (Vec<Arc<Subscription>>, usize)
    where
        P: FnMut(&Subscription) -> bool,
    {
        let mut registry = self.registry.lock();
        if !registry.iter().any(|s| predicate(s.as_ref())) {
            return (Vec::new(), registry.len());
        }

        let (detached, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *registry)
            .into_iter()
            .partition(|s| predicate(s.as_ref()));
        *registry = kept;
        (detached, registry.len())
    }

    /// Освобождает вынутые подписки уже без блокировки: `Drop` обработчика
    /// или получателя может снова обратиться к этой шине. Затем убирает из
    /// пула имена, на которые больше никто не ссылается, включая имя из
    /// запроса `query`.
    ///
    /// Отсутствие совпадений не считается ошибкой.
    fn release(
        &self,
        op: &'static str,
        query: Receiver,
        (detached, remaining): (Vec<Arc<Subscription>>, usize),
    ) -> usize {
        let mut names: Vec<Arc<str>> = match query {
            Receiver::Named(name) => vec![name],
            _ => Vec::new(),
        };

        let removed = detached.len();
        if removed == 0 {
            trace!(op, "Nothing to unregister");
        } else {
            self.stats.record_removed(removed);
            debug!(op, removed, remaining, "Handlers unregistered");

            names.extend(detached.iter().filter_map(|s| match &s.receiver {
                Receiver::Named(name) => Some(name.clone()),
                _ => None,
            }));
            drop(detached);
        }

        release_names(names);
        removed
    }

    ////////////////////////////////////////////////////////////////////////////
    // Доставка
    ////////////////////////////////////////////////////////////////////////////

    /// Отправляет сообщение всем подписчикам типа `T` в порядке регистрации.
    ///
    /// Возвращает число обработчиков, завершившихся успешно. Отсутствие
    /// подписчиков не ошибка. Паника обработчика перехватывается и
    /// обрабатывается согласно [`DispatchPolicy`].
    pub fn send<T: 'static>(
        &self,
        message: T,
    ) -> Result<usize, BusError> {
        self.send_ref(&message)
    }

    /// Как [`MessageBus::send`], но без передачи владения сообщением.
    pub fn send_ref<T: 'static>(
        &self,
        message: &T,
    ) -> Result<usize, BusError> {
        self.stats.record_send();
        let message_type = type_name::<T>();

        // Снимок: изменения реестра из обработчиков не влияют на эту доставку.
        let targets = self.snapshot::<T>();
        if targets.is_empty() {
            trace!(message_type, "No subscribers");
            return Ok(0);
        }
        trace!(message_type, subscribers = targets.len(), "Dispatching");

        let mut delivered = 0;
        let mut failures = Vec::new();

        for subscription in &targets {
            let Some(handler) = subscription.handler::<T>() else {
                continue;
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.call(message)));
            let Err(payload) = outcome else {
                delivered += 1;
                continue;
            };

            let reason = panic_reason(payload.as_ref());
            self.stats.record_failure();
            warn!(
                subscription = %subscription.id,
                receiver = %subscription.receiver,
                message_type,
                reason = %reason,
                policy = %self.policy,
                "Handler panicked"
            );

            match self.policy {
                DispatchPolicy::FailFast => {
                    self.stats.record_deliveries(delivered);
                    return Err(BusError::HandlerPanicked {
                        message_type,
                        subscription: subscription.id.get(),
                        reason,
                    });
                }
                DispatchPolicy::CollectAll => failures.push(HandlerFailure {
                    subscription: subscription.id.get(),
                    reason,
                }),
            }
        }

        self.stats.record_deliveries(delivered);
        if failures.is_empty() {
            Ok(delivered)
        } else {
            Err(BusError::DispatchFailed {
                message_type,
                delivered,
                failures,
            })
        }
    }

    fn snapshot<T: 'static>(&self) -> Vec<Arc<Subscription>> {
        self.registry
            .lock()
            .iter()
            .filter(|s| s.accepts::<T>())
            .cloned()
            .collect()
    }

    ////////////////////////////////////////////////////////////////////////////
    // Состояние
    ////////////////////////////////////////////////////////////////////////////

    /// Общее число живых подписок.
    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.lock().is_empty()
    }

    pub fn subscriber_count<T: 'static>(&self) -> usize {
        self.registry
            .lock()
            .iter()
            .filter(|s| s.accepts::<T>())
            .count()
    }

    pub fn has_subscribers<T: 'static>(&self) -> bool {
        self.registry.lock().iter().any(|s| s.accepts::<T>())
    }

    /// Различные получатели (кроме глобального) в порядке первой регистрации.
    pub fn receivers(&self) -> Vec<Receiver> {
        let registry = self.registry.lock();
        let mut receivers: Vec<Receiver> = Vec::new();
        for s in registry.iter().filter(|s| !s.receiver.is_global()) {
            if !receivers.contains(&s.receiver) {
                receivers.push(s.receiver.clone());
            }
        }
        receivers
    }

    /// Дескрипторы всех живых подписок в порядке регистрации.
    pub fn subscriptions(&self) -> Vec<SubscriptionHandle> {
        self.registry.lock().iter().map(|s| s.handle()).collect()
    }

    pub fn stats(&self) -> BusStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("subscriptions", &self.len())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Текст паники: `&str` или `String`, иначе заглушка.
fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
