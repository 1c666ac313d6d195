use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, error};

use crate::{
    cell::ServiceCell,
    container_configuration::ContainerConfig,
    container_metrics::{ContainerStats, ResolutionCounters},
    errors::DIError,
    identifier::Identifier,
};

/// Реестр одного контейнера: cells по identifier + ссылка на родителя
///
/// Lock держится только на время lookup/insert. Cells выдаются наружу как
/// `Arc`, фабрики всегда вызываются после освобождения lock, поэтому
/// вложенное разрешение из фабрики может снова зайти в любой контейнер.
pub(crate) struct ContainerCore {
    config: ContainerConfig,
    parent: Option<Arc<ContainerCore>>,
    entries: RwLock<HashMap<Identifier, Arc<ServiceCell>>>,
    counters: ResolutionCounters,
}

impl ContainerCore {
    pub(crate) fn new(config: ContainerConfig, parent: Option<Arc<ContainerCore>>) -> Self {
        Self {
            config,
            parent,
            entries: RwLock::new(HashMap::new()),
            counters: ResolutionCounters::default(),
        }
    }

    pub(crate) fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub(crate) fn name(&self) -> &str {
        &self.config.name
    }

    pub(crate) fn parent(&self) -> Option<&Arc<ContainerCore>> {
        self.parent.as_ref()
    }

    /// Check-and-insert под write lock; существующая регистрация не перезаписывается
    pub(crate) fn insert(&self, cell: ServiceCell) -> Result<(), DIError> {
        let mut entries = self.entries.write();
        if entries.contains_key(cell.id()) {
            error!(
                "Duplicate registration of {} in container '{}'",
                cell.id(),
                self.name()
            );
            return Err(DIError::duplicate(cell.id()));
        }

        debug!(
            "Registered {} ({}{}) in container '{}'",
            cell.id(),
            cell.lifetime(),
            if cell.is_async() { ", async" } else { "" },
            self.name()
        );
        entries.insert(cell.id().clone(), Arc::new(cell));
        Ok(())
    }

    /// Локальный поиск, затем по цепочке родителей
    pub(crate) fn lookup(&self, id: &Identifier) -> Option<Arc<ServiceCell>> {
        if let Some(cell) = self.entries.read().get(id) {
            return Some(Arc::clone(cell));
        }

        let mut current = self.parent.as_deref();
        while let Some(core) = current {
            if let Some(cell) = core.entries.read().get(id) {
                debug!("{} resolved from ancestor '{}'", id, core.name());
                return Some(Arc::clone(cell));
            }
            current = core.parent.as_deref();
        }
        None
    }

    /// Локальные cells в детерминированном порядке
    pub(crate) fn local_cells(&self) -> Vec<Arc<ServiceCell>> {
        let mut cells: Vec<_> = self.entries.read().values().cloned().collect();
        cells.sort_by(|a, b| {
            (a.id().type_name(), a.id().name()).cmp(&(b.id().type_name(), b.id().name()))
        });
        cells
    }

    pub(crate) fn record_resolution(&self, success: bool) {
        self.counters.record(success);
    }

    pub(crate) fn stats(&self) -> ContainerStats {
        let entries = self.entries.read();
        ContainerStats {
            name: self.name().to_string(),
            registrations: entries.len(),
            async_registrations: entries.values().filter(|cell| cell.is_async()).count(),
            cached_singletons: entries.values().filter(|cell| cell.is_populated()).count(),
            factory_invocations: entries.values().map(|cell| cell.invocations()).sum(),
            total_resolutions: self.counters.total(),
            failed_resolutions: self.counters.failed(),
        }
    }
}

impl Drop for ContainerCore {
    fn drop(&mut self) {
        debug!(
            "Container '{}' dropped, releasing {} registrations",
            self.config.name,
            self.entries.get_mut().len()
        );
    }
}
