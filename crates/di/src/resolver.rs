//! Resolver - read-only доступ к контейнеру
//!
//! Три формы разрешения:
//! - `try_resolve*` → `Option`, никогда не паникует
//! - `resolve*` → `Result<Arc<T>, DIError>`, вызывающий решает сам (`?` / `expect`)
//! - `require*` → паника с `DIError` в payload: громкий отказ при ошибке wiring
//!
//! Фабрикам всегда передаётся resolver того контейнера, с которого началось
//! разрешение, даже если cell найдена у предка.

use std::{any::type_name, sync::Arc};
use tracing::{debug, error, info, warn};

use crate::{
    cell::Instance, container_core::ContainerCore, cycle_guard::ResolutionGuard,
    errors::DIError, identifier::Identifier,
};

#[derive(Clone)]
pub struct Resolver {
    core: Arc<ContainerCore>,
}

impl Resolver {
    pub(crate) fn new(core: Arc<ContainerCore>) -> Self {
        Self { core }
    }

    /// Имя контейнера, с которого идёт разрешение
    pub fn container_name(&self) -> &str {
        self.core.name()
    }

    pub(crate) fn resolve_erased(&self, id: &Identifier) -> Result<Instance, DIError> {
        let cell = self.core.lookup(id).ok_or_else(|| DIError::not_found(id))?;

        let config = self.core.config();
        let _guard = ResolutionGuard::enter(&cell, config.cycle_detection, config.max_dependency_depth)?;
        cell.resolve_sync(self)
    }

    async fn resolve_erased_async(&self, id: &Identifier) -> Result<Instance, DIError> {
        let cell = self.core.lookup(id).ok_or_else(|| DIError::not_found(id))?;
        cell.resolve_async(self).await
    }

    fn downcast<T>(id: &Identifier, instance: Instance) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        instance.downcast::<T>().map_err(|_| {
            warn!("Type mismatch for {}: expected {}", id, type_name::<T>());
            DIError::not_found(id)
        })
    }

    fn finish<T>(&self, id: &Identifier, result: Result<Arc<T>, DIError>) -> Result<Arc<T>, DIError> {
        self.core.record_resolution(result.is_ok());
        match &result {
            Ok(_) => debug!("Resolved {} via '{}'", id, self.core.name()),
            Err(e) => debug!("Failed to resolve {} via '{}': {}", id, self.core.name(), e),
        }
        result
    }

    fn soften<T>(id: &Identifier, result: Result<Arc<T>, DIError>) -> Option<Arc<T>> {
        match result {
            Ok(instance) => Some(instance),
            // Отсутствует сам запрошенный identifier
            Err(DIError::NotFound { type_name, name })
                if type_name == id.type_name() && name.as_deref() == id.name() =>
            {
                None
            }
            Err(e @ DIError::AsyncOnly { .. }) => {
                info!("{}", e);
                None
            }
            Err(e) => {
                warn!("try_resolve for {} swallowed error: {}", id, e);
                None
            }
        }
    }

    fn resolve_identifier<T>(&self, id: &Identifier) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        let result = self
            .resolve_erased(id)
            .and_then(|instance| Self::downcast::<T>(id, instance));
        self.finish(id, result)
    }

    async fn resolve_identifier_async<T>(&self, id: &Identifier) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        let result = self
            .resolve_erased_async(id)
            .await
            .and_then(|instance| Self::downcast::<T>(id, instance));
        self.finish(id, result)
    }

    fn require_identifier<T>(&self, id: &Identifier) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        match self.resolve_identifier::<T>(id) {
            Ok(instance) => instance,
            Err(e) => {
                error!("Required dependency unavailable in '{}': {}", self.core.name(), e);
                std::panic::panic_any(e)
            }
        }
    }

    pub fn resolve<T>(&self) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_identifier(&Identifier::of::<T>())
    }

    pub fn resolve_named<T>(&self, name: &str) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_identifier(&Identifier::named::<T>(name))
    }

    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let id = Identifier::of::<T>();
        Self::soften(&id, self.resolve_identifier(&id))
    }

    pub fn try_resolve_named<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let id = Identifier::named::<T>(name);
        Self::soften(&id, self.resolve_identifier(&id))
    }

    /// Разрешить или запаниковать с `DIError` в payload
    pub fn require<T>(&self) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        self.require_identifier(&Identifier::of::<T>())
    }

    pub fn require_named<T>(&self, name: &str) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        self.require_identifier(&Identifier::named::<T>(name))
    }

    /// Async разрешение: обслуживает и sync, и async регистрации
    pub async fn resolve_async<T>(&self) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_identifier_async(&Identifier::of::<T>()).await
    }

    pub async fn resolve_async_named<T>(&self, name: &str) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_identifier_async(&Identifier::named::<T>(name)).await
    }

    pub async fn try_resolve_async<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let id = Identifier::of::<T>();
        let result = self.resolve_identifier_async(&id).await;
        Self::soften(&id, result)
    }

    pub async fn try_resolve_async_named<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let id = Identifier::named::<T>(name);
        let result = self.resolve_identifier_async(&id).await;
        Self::soften(&id, result)
    }

    /// Есть ли регистрация здесь или у предков
    pub fn is_registered<T>(&self) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.core.lookup(&Identifier::of::<T>()).is_some()
    }

    pub fn is_registered_named<T>(&self, name: &str) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.core.lookup(&Identifier::named::<T>(name)).is_some()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("container", &self.core.name())
            .finish()
    }
}
