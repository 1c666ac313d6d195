use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Статистика контейнера для диагностики
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    pub name: String,
    /// Локальные регистрации (sync + async)
    pub registrations: usize,
    pub async_registrations: usize,
    /// Заполненные singleton cells этого контейнера
    pub cached_singletons: usize,
    /// Вызовы фабрик локальных cells
    pub factory_invocations: u64,
    /// Разрешения, начатые через этот контейнер (включая вложенные)
    pub total_resolutions: u64,
    pub failed_resolutions: u64,
}

#[derive(Debug, Default)]
pub(crate) struct ResolutionCounters {
    total: AtomicU64,
    failed: AtomicU64,
}

impl ResolutionCounters {
    pub(crate) fn record(&self, success: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub(crate) fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}
