use std::{any::type_name, fmt, sync::Arc};

/// Типобезопасный обработчик сообщений типа `T`.
///
/// Идентичность обработчика задаёт общий вызываемый объект: клоны одного
/// `Handler` равны между собой, а два отдельно созданных обработчика не
/// равны никогда, даже из одинаковых замыканий. Именно эта идентичность
/// используется при `unregister_handler`.
pub struct Handler<T: 'static> {
    callback: Arc<dyn Fn(&T) + Send + Sync>,
}

impl<T: 'static> Handler<T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    #[inline]
    pub(crate) fn call(
        &self,
        message: &T,
    ) {
        (self.callback)(message)
    }

    /// `true`, если оба обработчика являются клонами одного и того же.
    pub fn same(
        &self,
        other: &Self,
    ) -> bool {
        self.addr() == other.addr()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.callback) as *const ()
    }
}

impl<T: 'static> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T: 'static> PartialEq for Handler<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.same(other)
    }
}

impl<T: 'static> Eq for Handler<T> {}

impl<T: 'static> fmt::Debug for Handler<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Handler<{}>({:p})", type_name::<T>(), self.addr())
    }
}
