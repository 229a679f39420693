use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Пул для повторного использования `Arc<str>` по одинаковым именам
/// получателей. Crate-private.
///
/// Имя остаётся в пуле, пока на него ссылается хоть один `Receiver`.
/// Освобождение выполняет `release_names` после отписки.
static RECEIVER_NAMES: Lazy<DashMap<String, Arc<str>>> = Lazy::new(DashMap::new);

/// Возвращает interned `Arc<str>` для имени получателя.
///
/// При первом вызове для нового имени создаёт `Arc<str>` и сохраняет его в
/// пуле; конкурентные вызовы для одного имени получают один и тот же `Arc`.
#[inline]
pub(crate) fn intern_name<S: AsRef<str>>(name: S) -> Arc<str> {
    let key = name.as_ref();
    if let Some(existing) = RECEIVER_NAMES.get(key) {
        return existing.clone();
    }
    RECEIVER_NAMES
        .entry(key.to_owned())
        .or_insert_with(|| Arc::from(key))
        .clone()
}

/// Убирает из пула имена, на которые больше никто не ссылается.
///
/// `names` принадлежат вызывающему: для каждого имени кроме пула остаётся
/// ровно эта ссылка. Если имя всё ещё держит подписка или пользовательский
/// `Receiver`, оно остаётся в пуле.
pub(crate) fn release_names(mut names: Vec<Arc<str>>) {
    names.sort_unstable();
    names.dedup_by(|a, b| Arc::ptr_eq(a, b));
    for name in names {
        RECEIVER_NAMES.remove_if(&*name, |_, pooled| {
            Arc::ptr_eq(pooled, &name) && Arc::strong_count(pooled) <= 2
        });
    }
}

#[cfg(test)]
pub(crate) fn is_interned(name: &str) -> bool {
    RECEIVER_NAMES.contains_key(name)
}
