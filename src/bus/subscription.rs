use std::{
    any::{type_name, Any, TypeId},
    fmt,
};

use super::{Handler, Receiver};

/// Уникальный (в пределах одной шины) идентификатор подписки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Дескриптор, возвращаемый при регистрации.
///
/// Позволяет снять ровно одну подписку через `MessageBus::unsubscribe`,
/// не полагаясь на сравнение обработчиков.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    receiver: Receiver,
    message_type: &'static str,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn message_type(&self) -> &'static str {
        self.message_type
    }
}

/// Запись реестра: (получатель, тип сообщения, обработчик).
///
/// Обработчик хранится со стёртым типом; `TypeId` гарантирует, что
/// downcast к `Handler<T>` выполняется только для точного `T`.
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) receiver: Receiver,
    message_type: TypeId,
    type_name: &'static str,
    handler: Box<dyn Any + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new<T: 'static>(
        id: SubscriptionId,
        receiver: Receiver,
        handler: Handler<T>,
    ) -> Self {
        Self {
            id,
            receiver,
            message_type: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            handler: Box::new(handler),
        }
    }

    #[inline]
    pub(crate) fn accepts<T: 'static>(&self) -> bool {
        self.message_type == TypeId::of::<T>()
    }

    pub(crate) fn handler<T: 'static>(&self) -> Option<&Handler<T>> {
        self.handler.downcast_ref::<Handler<T>>()
    }

    /// Совпадает ли сохранённый обработчик с `other` по идентичности.
    pub(crate) fn holds<T: 'static>(
        &self,
        other: &Handler<T>,
    ) -> bool {
        self.handler::<T>().is_some_and(|h| h.same(other))
    }

    pub(crate) fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle {
            id: self.id,
            receiver: self.receiver.clone(),
            message_type: self.type_name,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("receiver", &self.receiver)
            .field("message_type", &self.type_name)
            .finish()
    }
}
