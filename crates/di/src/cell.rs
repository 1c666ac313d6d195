//! Resolver cells - единица регистрации
//!
//! Cell хранит фабрику и, для `ContainerSingleton`, лениво заполняемый
//! экземпляр. Sync и async семейства разведены по вариантам `CellKind`,
//! чтобы контракт вызова (блокирующий или с ожиданием) был виден в месте
//! вызова.
//!
//! Singleton cell переходит `Empty -> Populated` ровно один раз: гейт
//! (`once_cell::sync::OnceCell` / `tokio::sync::OnceCell`) держит конкурентных
//! первых вызывающих, пока работает единственный вызов фабрики. Неудачный
//! вызов оставляет cell пустой.

use futures::future::BoxFuture;
use std::{
    any::Any,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{errors::DIError, identifier::Identifier, lifetime::Lifetime, resolver::Resolver};

/// Type-erased экземпляр
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type SyncFactory = Box<dyn Fn(&Resolver) -> Result<Instance, DIError> + Send + Sync>;

pub(crate) type AsyncFactory =
    Box<dyn Fn(Resolver) -> BoxFuture<'static, Result<Instance, DIError>> + Send + Sync>;

pub(crate) enum SyncCell {
    Transient {
        factory: SyncFactory,
    },
    Singleton {
        factory: SyncFactory,
        instance: once_cell::sync::OnceCell<Instance>,
    },
}

pub(crate) enum AsyncCell {
    Transient {
        factory: AsyncFactory,
    },
    Singleton {
        factory: AsyncFactory,
        instance: tokio::sync::OnceCell<Instance>,
    },
}

pub(crate) enum CellKind {
    Sync(SyncCell),
    Async(AsyncCell),
}

/// Зарегистрированная фабрика со своей политикой кэширования
pub(crate) struct ServiceCell {
    id: Identifier,
    lifetime: Lifetime,
    invocations: AtomicU64,
    kind: CellKind,
}

impl SyncCell {
    fn resolve(&self, resolver: &Resolver, invocations: &AtomicU64) -> Result<Instance, DIError> {
        match self {
            SyncCell::Transient { factory } => {
                invocations.fetch_add(1, Ordering::Relaxed);
                factory(resolver)
            }
            SyncCell::Singleton { factory, instance } => instance
                .get_or_try_init(|| {
                    invocations.fetch_add(1, Ordering::Relaxed);
                    factory(resolver)
                })
                .cloned(),
        }
    }

    fn is_populated(&self) -> bool {
        match self {
            SyncCell::Transient { .. } => false,
            SyncCell::Singleton { instance, .. } => instance.get().is_some(),
        }
    }
}

impl AsyncCell {
    async fn resolve(&self, resolver: &Resolver, invocations: &AtomicU64) -> Result<Instance, DIError> {
        match self {
            AsyncCell::Transient { factory } => {
                invocations.fetch_add(1, Ordering::Relaxed);
                factory(resolver.clone()).await
            }
            AsyncCell::Singleton { factory, instance } => instance
                .get_or_try_init(|| {
                    invocations.fetch_add(1, Ordering::Relaxed);
                    factory(resolver.clone())
                })
                .await
                .cloned(),
        }
    }

    fn is_populated(&self) -> bool {
        match self {
            AsyncCell::Transient { .. } => false,
            AsyncCell::Singleton { instance, .. } => instance.initialized(),
        }
    }
}

impl ServiceCell {
    pub(crate) fn new_sync(id: Identifier, lifetime: Lifetime, factory: SyncFactory) -> Self {
        let cell = match lifetime {
            Lifetime::Transient => SyncCell::Transient { factory },
            Lifetime::ContainerSingleton => SyncCell::Singleton {
                factory,
                instance: once_cell::sync::OnceCell::new(),
            },
        };
        Self {
            id,
            lifetime,
            invocations: AtomicU64::new(0),
            kind: CellKind::Sync(cell),
        }
    }

    pub(crate) fn new_async(id: Identifier, lifetime: Lifetime, factory: AsyncFactory) -> Self {
        let cell = match lifetime {
            Lifetime::Transient => AsyncCell::Transient { factory },
            Lifetime::ContainerSingleton => AsyncCell::Singleton {
                factory,
                instance: tokio::sync::OnceCell::new(),
            },
        };
        Self {
            id,
            lifetime,
            invocations: AtomicU64::new(0),
            kind: CellKind::Async(cell),
        }
    }

    /// Уже заполненный singleton для готового значения
    pub(crate) fn new_instance(id: Identifier, value: Instance) -> Self {
        let stored = value.clone();
        Self {
            id,
            lifetime: Lifetime::ContainerSingleton,
            invocations: AtomicU64::new(0),
            kind: CellKind::Sync(SyncCell::Singleton {
                factory: Box::new(move |_| Ok(stored.clone())),
                instance: once_cell::sync::OnceCell::with_value(value),
            }),
        }
    }

    pub(crate) fn id(&self) -> &Identifier {
        &self.id
    }

    pub(crate) fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) fn is_async(&self) -> bool {
        matches!(self.kind, CellKind::Async(_))
    }

    pub(crate) fn is_populated(&self) -> bool {
        match &self.kind {
            CellKind::Sync(cell) => cell.is_populated(),
            CellKind::Async(cell) => cell.is_populated(),
        }
    }

    pub(crate) fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Синхронное разрешение; async cell даёт `DIError::AsyncOnly`
    pub(crate) fn resolve_sync(&self, resolver: &Resolver) -> Result<Instance, DIError> {
        match &self.kind {
            CellKind::Sync(cell) => cell.resolve(resolver, &self.invocations),
            CellKind::Async(_) => Err(DIError::async_only(&self.id)),
        }
    }

    pub(crate) async fn resolve_async(&self, resolver: &Resolver) -> Result<Instance, DIError> {
        match &self.kind {
            CellKind::Sync(cell) => cell.resolve(resolver, &self.invocations),
            CellKind::Async(cell) => cell.resolve(resolver, &self.invocations).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::DIContainer;

    fn value_factory(value: u32) -> SyncFactory {
        Box::new(move |_| Ok(Arc::new(value) as Instance))
    }

    #[test]
    fn test_transient_cell_invokes_every_time() {
        let container = DIContainer::new();
        let resolver = container.resolver();
        let cell = ServiceCell::new_sync(Identifier::of::<u32>(), Lifetime::Transient, value_factory(7));

        let first = cell.resolve_sync(&resolver).unwrap();
        let second = cell.resolve_sync(&resolver).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cell.invocations(), 2);
        assert!(!cell.is_populated());
    }

    #[test]
    fn test_singleton_cell_populates_once() {
        let container = DIContainer::new();
        let resolver = container.resolver();
        let cell = ServiceCell::new_sync(
            Identifier::of::<u32>(),
            Lifetime::ContainerSingleton,
            value_factory(7),
        );
        assert!(!cell.is_populated());

        let first = cell.resolve_sync(&resolver).unwrap();
        let second = cell.resolve_sync(&resolver).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cell.invocations(), 1);
        assert!(cell.is_populated());
    }

    #[test]
    fn test_failed_singleton_stays_empty() {
        let container = DIContainer::new();
        let resolver = container.resolver();
        let id = Identifier::of::<u32>();
        let failing: SyncFactory = Box::new(|_| {
            Err(DIError::Factory {
                type_name: "u32".to_string(),
                name: None,
                message: "boom".to_string(),
            })
        });
        let cell = ServiceCell::new_sync(id, Lifetime::ContainerSingleton, failing);

        assert!(cell.resolve_sync(&resolver).is_err());
        assert!(cell.resolve_sync(&resolver).is_err());
        assert!(!cell.is_populated());
        assert_eq!(cell.invocations(), 2);
    }

    #[test]
    fn test_async_cell_rejects_sync_resolution() {
        let container = DIContainer::new();
        let resolver = container.resolver();
        let factory: AsyncFactory = Box::new(|_| Box::pin(async { Ok::<_, DIError>(Arc::new(1u8) as Instance) }));
        let cell = ServiceCell::new_async(Identifier::of::<u8>(), Lifetime::Transient, factory);

        let error = cell.resolve_sync(&resolver).unwrap_err();
        assert!(matches!(error, DIError::AsyncOnly { .. }));
        assert_eq!(cell.invocations(), 0);
    }

    #[tokio::test]
    async fn test_async_singleton_cell_populates_once() {
        let container = DIContainer::new();
        let resolver = container.resolver();
        let factory: AsyncFactory = Box::new(|_| {
            Box::pin(async {
                tokio::task::yield_now().await;
                Ok::<_, DIError>(Arc::new(String::from("db")) as Instance)
            })
        });
        let cell = ServiceCell::new_async(Identifier::of::<String>(), Lifetime::ContainerSingleton, factory);

        let first = cell.resolve_async(&resolver).await.unwrap();
        let second = cell.resolve_async(&resolver).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cell.invocations(), 1);
        assert!(cell.is_populated());
    }
}
