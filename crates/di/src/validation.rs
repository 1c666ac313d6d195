//! Validation - eager проход по sync регистрациям
//!
//! Каждая локальная sync регистрация разрешается через resolver своего
//! контейнера. Ошибки и паники фабрик (включая `require`) превращаются в
//! `ValidationError`; проход останавливается на первой ошибке и затем
//! повторяется у родителя. Async регистрации пропускаются.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{debug, info, warn};

use crate::{
    container_core::ContainerCore,
    cycle_guard::ValidationScope,
    errors::{DIError, ValidationError},
    identifier::Identifier,
    resolver::Resolver,
};

pub(crate) fn validate_chain(core: &Arc<ContainerCore>) -> Result<(), ValidationError> {
    let mut current = Some(Arc::clone(core));
    while let Some(core) = current {
        validate_local(&core)?;
        current = core.parent().cloned();
    }
    Ok(())
}

fn validate_local(core: &Arc<ContainerCore>) -> Result<(), ValidationError> {
    let resolver = Resolver::new(Arc::clone(core));
    let _scope = ValidationScope::enter();
    let cells = core.local_cells();
    let mut checked = 0usize;

    for cell in &cells {
        let id = cell.id();
        if cell.is_async() {
            debug!("Validation skips async registration {}", id);
            continue;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve_erased(id)));
        let failure = match outcome {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(ValidationError::from(e)),
            Err(payload) => Some(from_panic(id, payload)),
        };

        if let Some(error) = failure {
            warn!(
                "Validation of container '{}' failed at {}: {}",
                core.name(),
                id,
                error
            );
            return Err(error);
        }
        checked += 1;
    }

    info!(
        "Container '{}' validated: {} sync registrations resolved",
        core.name(),
        checked
    );
    Ok(())
}

fn from_panic(id: &Identifier, payload: Box<dyn Any + Send>) -> ValidationError {
    let payload = match payload.downcast::<DIError>() {
        Ok(error) => return ValidationError::from(*error),
        Err(other) => other,
    };

    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    ValidationError::new(format!("factory panicked: {}", message), id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{container::DIContainer, lifetime::Lifetime};

    struct TypeA;
    #[allow(dead_code)]
    struct TypeB(u8);

    #[test]
    fn test_empty_container_is_valid() {
        assert!(DIContainer::new().validate().is_ok());
    }

    #[test]
    fn test_panicking_factory_is_reported() {
        let container = DIContainer::new();
        container
            .register_transient::<TypeA, _>(|_| panic!("wiring exploded"))
            .unwrap();

        let error = container.validate().unwrap_err();
        assert!(error.reason.contains("wiring exploded"));
        assert!(error.type_name.ends_with("TypeA"));
        assert_eq!(error.name, None);
    }

    #[test]
    fn test_require_panic_carries_missing_identifier() {
        let container = DIContainer::new();
        container
            .register_transient(|r| {
                let _b = r.require_named::<TypeB>("second");
                Ok(TypeA)
            })
            .unwrap();

        let error = container.validate().unwrap_err();
        assert!(error.type_name.ends_with("TypeB"));
        assert_eq!(error.name.as_deref(), Some("second"));
    }

    #[test]
    fn test_async_registrations_skipped() {
        let container = DIContainer::new();
        container
            .register_async::<TypeA, _, _>(None, Lifetime::Transient, |_| async {
                Err::<TypeA, _>(anyhow::anyhow!("never awaited by validate"))
            })
            .unwrap();

        assert!(container.validate().is_ok());
    }

    #[test]
    fn test_validation_populates_singletons() {
        let container = DIContainer::new();
        container.register_singleton(|_| Ok(TypeB(1))).unwrap();

        container.validate().unwrap();
        assert_eq!(container.stats().cached_singletons, 1);
    }
}
