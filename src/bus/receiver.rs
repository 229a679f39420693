use std::{any::Any, fmt, sync::Arc};

use super::intern::intern_name;

/// Идентичность получателя, к которой привязана подписка.
///
/// Шина никогда не разыменовывает получателя, а только сравнивает его:
/// - `Global`: подписка без получателя;
/// - `Named`: сравнение по значению имени;
/// - `Instance`: сравнение по адресу общего объекта (`Arc`), как сравнение
///   ссылок. Подписка удерживает объект, пока не будет снята.
#[derive(Clone, Default)]
pub enum Receiver {
    #[default]
    Global,
    Named(Arc<str>),
    Instance(Arc<dyn Any + Send + Sync>),
}

impl Receiver {
    pub fn global() -> Self {
        Self::Global
    }

    /// Получатель, идентифицируемый именем. Имена интернируются.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(intern_name(name))
    }

    /// Получатель, идентифицируемый конкретным объектом в `Arc`.
    ///
    /// Два `Receiver::instance` равны только если созданы из клонов одного и
    /// того же `Arc`.
    pub fn instance<T: Any + Send + Sync>(owner: &Arc<T>) -> Self {
        let erased: Arc<dyn Any + Send + Sync> = owner.clone();
        Self::Instance(erased)
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    fn instance_addr(owner: &Arc<dyn Any + Send + Sync>) -> *const () {
        Arc::as_ptr(owner) as *const ()
    }
}

impl PartialEq for Receiver {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Self::Global, Self::Global) => true,
            (Self::Named(a), Self::Named(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::Instance(a), Self::Instance(b)) => {
                Self::instance_addr(a) == Self::instance_addr(b)
            }
            _ => false,
        }
    }
}

impl Eq for Receiver {}

impl fmt::Debug for Receiver {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Global => write!(f, "Global"),
            Self::Named(name) => write!(f, "Named({name:?})"),
            Self::Instance(owner) => write!(f, "Instance({:p})", Self::instance_addr(owner)),
        }
    }
}

impl fmt::Display for Receiver {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Global => write!(f, "<global>"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Instance(owner) => write!(f, "{:p}", Self::instance_addr(owner)),
        }
    }
}

impl From<&str> for Receiver {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for Receiver {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<&Receiver> for Receiver {
    fn from(receiver: &Receiver) -> Self {
        receiver.clone()
    }
}
