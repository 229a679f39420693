use std::sync::atomic::{AtomicU64, Ordering};

/// Счётчики активности шины.
#[derive(Debug, Default)]
pub struct BusStats {
    registered: AtomicU64,
    removed: AtomicU64,
    sends: AtomicU64,
    deliveries: AtomicU64,
    failures: AtomicU64,
}

/// Снимок [`BusStats`] на момент вызова.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusStatsSnapshot {
    /// Всего успешных регистраций.
    pub registered: u64,
    /// Всего подписок, снятых любым способом (включая `clear`).
    pub removed: u64,
    /// Всего вызовов `send`, в том числе без подписчиков.
    pub sends: u64,
    /// Обработчиков, завершившихся без паники.
    pub deliveries: u64,
    /// Обработчиков, завершившихся паникой.
    pub failures: u64,
}

impl BusStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_registered(&self) {
        self.registered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removed(
        &self,
        count: usize,
    ) {
        self.removed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_send(&self) {
        self.sends.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deliveries(
        &self,
        count: usize,
    ) {
        self.deliveries.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BusStatsSnapshot {
        BusStatsSnapshot {
            registered: self.registered.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            sends: self.sends.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
