//! Ошибки DI контейнера
//!
//! - **DIError**: все ошибки регистрации и разрешения
//! - **ValidationError**: результат `validate()` в форме `{reason, type, name}`
//!
//! Фабрики возвращают `anyhow::Result`, поэтому вложенная `DIError` может
//! прийти обёрнутой в context. [`DIError::from_factory`] достаёт её из цепочки,
//! чтобы наружу ушла исходная причина (реально отсутствующая зависимость),
//! а не ошибка промежуточной фабрики.

use thiserror::Error;

use crate::identifier::Identifier;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DIError {
    /// Повторная регистрация того же (type, name) в одном контейнере
    #[error("Duplicate registration of {type_name} (name: {})", display_name(name))]
    DuplicateRegistration {
        type_name: String,
        name: Option<String>,
    },

    #[error("No registration found for {type_name} (name: {})", display_name(name))]
    NotFound {
        type_name: String,
        name: Option<String>,
    },

    /// Синхронный запрос попал на async-only регистрацию
    #[error("{type_name} (name: {}) is registered asynchronously; use resolve_async", display_name(name))]
    AsyncOnly {
        type_name: String,
        name: Option<String>,
    },

    #[error("Factory for {type_name} (name: {}) failed: {message}", display_name(name))]
    Factory {
        type_name: String,
        name: Option<String>,
        message: String,
    },

    #[error("Circular dependency detected at {type_name} (name: {}): {}", display_name(name), chain.join(" -> "))]
    CircularDependency {
        type_name: String,
        name: Option<String>,
        chain: Vec<String>,
    },

    #[error("Dependency depth {depth} exceeded at {type_name} (name: {})", display_name(name))]
    DepthExceeded {
        type_name: String,
        name: Option<String>,
        depth: usize,
    },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },
}

fn display_name(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("<none>")
}

impl DIError {
    pub(crate) fn duplicate(id: &Identifier) -> Self {
        DIError::DuplicateRegistration {
            type_name: id.type_name().to_string(),
            name: id.name().map(str::to_string),
        }
    }

    pub(crate) fn not_found(id: &Identifier) -> Self {
        DIError::NotFound {
            type_name: id.type_name().to_string(),
            name: id.name().map(str::to_string),
        }
    }

    pub(crate) fn async_only(id: &Identifier) -> Self {
        DIError::AsyncOnly {
            type_name: id.type_name().to_string(),
            name: id.name().map(str::to_string),
        }
    }

    pub(crate) fn circular(id: &Identifier, chain: Vec<String>) -> Self {
        DIError::CircularDependency {
            type_name: id.type_name().to_string(),
            name: id.name().map(str::to_string),
            chain,
        }
    }

    pub(crate) fn depth_exceeded(id: &Identifier, depth: usize) -> Self {
        DIError::DepthExceeded {
            type_name: id.type_name().to_string(),
            name: id.name().map(str::to_string),
            depth,
        }
    }

    /// Преобразовать ошибку фабрики: вложенная DIError пробрасывается как есть
    pub fn from_factory(id: &Identifier, error: anyhow::Error) -> Self {
        if let Some(inner) = error.chain().find_map(|e| e.downcast_ref::<DIError>()) {
            return inner.clone();
        }
        DIError::Factory {
            type_name: id.type_name().to_string(),
            name: id.name().map(str::to_string),
            message: format!("{:#}", error),
        }
    }

    /// Короткая причина без деталей типа
    pub fn reason(&self) -> &'static str {
        match self {
            DIError::DuplicateRegistration { .. } => "duplicate registration",
            DIError::NotFound { .. } => "registration not found",
            DIError::AsyncOnly { .. } => "asynchronous registration requires resolve_async",
            DIError::Factory { .. } => "factory failed",
            DIError::CircularDependency { .. } => "circular dependency",
            DIError::DepthExceeded { .. } => "dependency depth exceeded",
            DIError::Configuration { .. } => "invalid configuration",
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            DIError::DuplicateRegistration { type_name, .. }
            | DIError::NotFound { type_name, .. }
            | DIError::AsyncOnly { type_name, .. }
            | DIError::Factory { type_name, .. }
            | DIError::CircularDependency { type_name, .. }
            | DIError::DepthExceeded { type_name, .. } => Some(type_name),
            DIError::Configuration { .. } => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            DIError::DuplicateRegistration { name, .. }
            | DIError::NotFound { name, .. }
            | DIError::AsyncOnly { name, .. }
            | DIError::Factory { name, .. }
            | DIError::CircularDependency { name, .. }
            | DIError::DepthExceeded { name, .. } => name.as_deref(),
            DIError::Configuration { .. } => None,
        }
    }

    /// Ошибка означает "не найдено" для try_resolve
    pub fn is_not_found(&self) -> bool {
        matches!(self, DIError::NotFound { .. } | DIError::AsyncOnly { .. })
    }
}

/// Ошибка валидации графа: первая найденная проблема
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Validation failed: {reason} (type: {type_name}, name: {})", display_name(name))]
pub struct ValidationError {
    pub reason: String,
    pub type_name: String,
    pub name: Option<String>,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>, id: &Identifier) -> Self {
        Self {
            reason: reason.into(),
            type_name: id.type_name().to_string(),
            name: id.name().map(str::to_string),
        }
    }
}

impl From<DIError> for ValidationError {
    fn from(error: DIError) -> Self {
        let reason = match &error {
            DIError::Factory { message, .. } => format!("{}: {}", error.reason(), message),
            DIError::CircularDependency { chain, .. } => {
                format!("{}: {}", error.reason(), chain.join(" -> "))
            }
            DIError::Configuration { message, .. } => format!("{}: {}", error.reason(), message),
            other => other.reason().to_string(),
        };
        Self {
            reason,
            type_name: error.type_name().unwrap_or_default().to_string(),
            name: error.name().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    struct TypeB;

    #[test]
    fn test_nested_error_is_unwrapped_from_context() {
        let outer = Identifier::of::<u8>();
        let missing = Identifier::named::<TypeB>("second");

        let nested: anyhow::Result<()> = Err(DIError::not_found(&missing).into());
        let wrapped = nested.context("building u8").unwrap_err();

        let error = DIError::from_factory(&outer, wrapped);
        assert_eq!(error, DIError::not_found(&missing));
        assert_eq!(error.name(), Some("second"));
    }

    #[test]
    fn test_plain_factory_error_is_attributed_to_owner() {
        let owner = Identifier::of::<u8>();
        let error = DIError::from_factory(&owner, anyhow::anyhow!("disk unavailable"));

        match &error {
            DIError::Factory { type_name, message, .. } => {
                assert_eq!(type_name, "u8");
                assert!(message.contains("disk unavailable"));
            }
            other => panic!("Expected Factory error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_payload_shape() {
        let missing = Identifier::named::<TypeB>("second");
        let validation = ValidationError::from(DIError::not_found(&missing));

        assert_eq!(validation.reason, "registration not found");
        assert!(validation.type_name.ends_with("TypeB"));
        assert_eq!(validation.name.as_deref(), Some("second"));
    }
}
