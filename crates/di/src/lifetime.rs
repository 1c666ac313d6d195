use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::DIError;

/// Жизненный цикл регистрации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// Новый экземпляр при каждом разрешении
    #[default]
    Transient,
    /// Один экземпляр на контейнер, в котором сделана регистрация
    ContainerSingleton,
}

impl Lifetime {
    /// Кэширует ли cell результат фабрики
    pub fn is_cached(self) -> bool {
        matches!(self, Lifetime::ContainerSingleton)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Transient => f.write_str("transient"),
            Lifetime::ContainerSingleton => f.write_str("container_singleton"),
        }
    }
}

impl FromStr for Lifetime {
    type Err = DIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transient" => Ok(Lifetime::Transient),
            "container_singleton" | "singleton" => Ok(Lifetime::ContainerSingleton),
            other => Err(DIError::Configuration {
                message: format!("unknown lifetime '{}'", other),
                field: Some("lifetime".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_transient() {
        assert_eq!(Lifetime::default(), Lifetime::Transient);
        assert!(!Lifetime::default().is_cached());
        assert!(Lifetime::ContainerSingleton.is_cached());
    }

    #[test]
    fn test_parse() {
        assert_eq!("Singleton".parse::<Lifetime>().unwrap(), Lifetime::ContainerSingleton);
        assert_eq!(" transient ".parse::<Lifetime>().unwrap(), Lifetime::Transient);
        assert!("scoped".parse::<Lifetime>().is_err());
    }
}
