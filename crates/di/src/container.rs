//! DIContainer - реестр фабрик + разрешение + валидация
//!
//! Контейнер - дешёвый `Clone` handle над общим состоянием. Дочерний
//! контейнер держит родителя и при промахе делегирует ему поиск. Singleton
//! кэшируется в cell того контейнера, где сделана регистрация: ребёнок со
//! своей регистрацией того же identifier получает свой экземпляр.

use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};

use crate::{
    cell::{AsyncFactory, Instance, ServiceCell, SyncFactory},
    container_configuration::ContainerConfig,
    container_core::ContainerCore,
    container_metrics::ContainerStats,
    errors::{DIError, ValidationError},
    identifier::Identifier,
    lifetime::Lifetime,
    resolver::Resolver,
    validation,
};

#[derive(Clone)]
pub struct DIContainer {
    core: Arc<ContainerCore>,
    resolver: Resolver,
}

impl DIContainer {
    /// Корневой контейнер с конфигурацией по умолчанию
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::from_core(ContainerCore::new(config, None))
    }

    /// Дочерний контейнер: наследует конфигурацию, промахи уходят к `self`
    pub fn child(&self) -> Self {
        Self::with_parent(self, self.core.config().child(None))
    }

    pub fn child_named(&self, name: &str) -> Self {
        Self::with_parent(self, self.core.config().child(Some(name)))
    }

    pub fn with_parent(parent: &DIContainer, config: ContainerConfig) -> Self {
        Self::from_core(ContainerCore::new(config, Some(Arc::clone(&parent.core))))
    }

    fn from_core(core: ContainerCore) -> Self {
        Self::from_core_arc(Arc::new(core))
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn config(&self) -> &ContainerConfig {
        self.core.config()
    }

    pub fn parent(&self) -> Option<DIContainer> {
        self.core.parent().map(|core| Self::from_core_arc(Arc::clone(core)))
    }

    fn from_core_arc(core: Arc<ContainerCore>) -> Self {
        let resolver = Resolver::new(Arc::clone(&core));
        Self { core, resolver }
    }

    /// Resolve-only view для передачи в код, которому регистрация не нужна
    pub fn resolver(&self) -> Resolver {
        self.resolver.clone()
    }

    /// Зарегистрировать синхронную фабрику
    ///
    /// Повтор того же (type, name) в этом контейнере - `DIError::DuplicateRegistration`,
    /// в том числе если первая регистрация была async.
    pub fn register<T, F>(&self, name: Option<&str>, lifetime: Lifetime, factory: F) -> Result<(), DIError>
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let id = Identifier::new::<T>(name);
        let owner = id.clone();

        let wrapped: SyncFactory = Box::new(move |resolver: &Resolver| {
            factory(resolver)
                .map(|value| Arc::new(value) as Instance)
                .map_err(|e| DIError::from_factory(&owner, e))
        });

        self.core.insert(ServiceCell::new_sync(id, lifetime, wrapped))
    }

    pub fn register_transient<T, F>(&self, factory: F) -> Result<(), DIError>
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register(None, Lifetime::Transient, factory)
    }

    pub fn register_singleton<T, F>(&self, factory: F) -> Result<(), DIError>
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register(None, Lifetime::ContainerSingleton, factory)
    }

    /// Готовое значение как уже заполненный singleton
    pub fn register_instance<T>(&self, name: Option<&str>, value: T) -> Result<(), DIError>
    where
        T: Send + Sync + 'static,
    {
        let id = Identifier::new::<T>(name);
        self.core.insert(ServiceCell::new_instance(id, Arc::new(value)))
    }

    /// Зарегистрировать асинхронную фабрику
    ///
    /// Разрешается только через `resolve_async*`; синхронный запрос получит
    /// `DIError::AsyncOnly`.
    pub fn register_async<T, F, Fut>(
        &self,
        name: Option<&str>,
        lifetime: Lifetime,
        factory: F,
    ) -> Result<(), DIError>
    where
        T: Send + Sync + 'static,
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let id = Identifier::new::<T>(name);
        let owner = id.clone();

        let wrapped: AsyncFactory = Box::new(
            move |resolver: Resolver| -> BoxFuture<'static, Result<Instance, DIError>> {
                let owner = owner.clone();
                let pending = factory(resolver);
                Box::pin(async move {
                    pending
                        .await
                        .map(|value| Arc::new(value) as Instance)
                        .map_err(|e| DIError::from_factory(&owner, e))
                })
            },
        );

        self.core.insert(ServiceCell::new_async(id, lifetime, wrapped))
    }

    pub fn resolve<T>(&self) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.resolve()
    }

    pub fn resolve_named<T>(&self, name: &str) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.resolve_named(name)
    }

    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.try_resolve()
    }

    pub fn try_resolve_named<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.try_resolve_named(name)
    }

    pub fn require<T>(&self) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.require()
    }

    pub fn require_named<T>(&self, name: &str) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.require_named(name)
    }

    pub async fn resolve_async<T>(&self) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.resolve_async().await
    }

    pub async fn resolve_async_named<T>(&self, name: &str) -> Result<Arc<T>, DIError>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.resolve_async_named(name).await
    }

    pub async fn try_resolve_async<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.try_resolve_async().await
    }

    pub async fn try_resolve_async_named<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.try_resolve_async_named(name).await
    }

    pub fn is_registered<T>(&self) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.resolver.is_registered::<T>()
    }

    pub fn is_registered_named<T>(&self, name: &str) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.resolver.is_registered_named::<T>(name)
    }

    /// Принудительно разрешить все локальные sync регистрации, затем у предков
    ///
    /// Возвращает первую ошибку. Паники фабрик (в том числе из `require`)
    /// перехватываются и тоже превращаются в `ValidationError`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_chain(&self.core)
    }

    pub fn stats(&self) -> ContainerStats {
        self.core.stats()
    }

    /// Локальные identifiers (для отладки)
    pub fn registered_identifiers(&self) -> Vec<Identifier> {
        self.core
            .local_cells()
            .iter()
            .map(|cell| cell.id().clone())
            .collect()
    }
}

impl Default for DIContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DIContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DIContainer")
            .field("name", &self.name())
            .field("parent", &self.core.parent().map(|p| p.name().to_string()))
            .finish()
    }
}
