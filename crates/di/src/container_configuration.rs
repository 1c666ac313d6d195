//! Container Configuration - настройки DI контейнера
//!
//! Источники: `Default`, пресеты, переменные окружения `DI_*`, TOML.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Когда вести стек разрешения для поиска циклов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleDetection {
    /// Никогда: рекурсивная фабрика уходит в бесконечную рекурсию
    Off,
    /// Только внутри `validate()`
    #[default]
    ValidationOnly,
    /// При каждом синхронном разрешении
    Always,
}

impl FromStr for CycleDetection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "false" | "0" => Ok(CycleDetection::Off),
            "validation" | "validation_only" => Ok(CycleDetection::ValidationOnly),
            "always" | "true" | "1" => Ok(CycleDetection::Always),
            other => Err(anyhow!("unknown cycle detection mode '{}'", other)),
        }
    }
}

/// Конфигурация DI контейнера
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Имя контейнера для логов и статистики
    pub name: String,
    pub cycle_detection: CycleDetection,
    /// Максимальная глубина стека разрешения (учитывается, пока ведётся стек)
    pub max_dependency_depth: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: "root".to_string(),
            cycle_detection: CycleDetection::ValidationOnly,
            max_dependency_depth: 64,
        }
    }
}

impl ContainerConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_cycle_detection(mut self, mode: CycleDetection) -> Self {
        self.cycle_detection = mode;
        self
    }

    /// Development конфигурация: стек разрешения ведётся всегда
    pub fn development() -> Self {
        Self {
            cycle_detection: CycleDetection::Always,
            max_dependency_depth: 32,
            ..Self::default()
        }
    }

    pub fn production() -> Self {
        Self {
            cycle_detection: CycleDetection::ValidationOnly,
            max_dependency_depth: 128,
            ..Self::default()
        }
    }

    /// Загрузить конфигурацию из переменных окружения
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("DI_CONTAINER_NAME") {
            config.name = name;
        }

        if let Ok(mode) = std::env::var("DI_CYCLE_DETECTION") {
            config.cycle_detection = mode.parse().context("DI_CYCLE_DETECTION")?;
        }

        if let Ok(depth) = std::env::var("DI_MAX_DEPENDENCY_DEPTH") {
            config.max_dependency_depth = depth
                .parse()
                .with_context(|| format!("DI_MAX_DEPENDENCY_DEPTH: invalid value '{}'", depth))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).context("Failed to parse container config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("name must not be empty"));
        }

        if self.max_dependency_depth == 0 {
            return Err(anyhow!("max_dependency_depth must be greater than 0"));
        }

        Ok(())
    }

    /// Конфигурация дочернего контейнера
    pub(crate) fn child(&self, name: Option<&str>) -> Self {
        let suffix = name.unwrap_or("child");
        Self {
            name: format!("{}/{}", self.name, suffix),
            ..self.clone()
        }
    }
}
