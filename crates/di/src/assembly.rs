//! Assembly - группировка регистраций
//!
//! Assembly получает контейнер и регистрирует в нём связанный набор фабрик.
//! `Assembler` применяет список assemblies в переданном порядке.

use tracing::debug;

use crate::{container::DIContainer, errors::DIError, resolver::Resolver};

pub trait Assembly {
    fn assemble(&self, container: &DIContainer) -> Result<(), DIError>;
}

impl<F> Assembly for F
where
    F: Fn(&DIContainer) -> Result<(), DIError>,
{
    fn assemble(&self, container: &DIContainer) -> Result<(), DIError> {
        self(container)
    }
}

pub struct Assembler {
    container: DIContainer,
}

impl Assembler {
    pub fn new() -> Self {
        Self::with_container(DIContainer::new())
    }

    pub fn with_container(container: DIContainer) -> Self {
        Self { container }
    }

    /// Assembler над дочерним контейнером родителя
    pub fn with_parent(parent: &Assembler) -> Self {
        Self::with_container(parent.container.child())
    }

    /// Применить assemblies по порядку; останавливается на первой ошибке
    pub fn apply(&self, assemblies: &[&dyn Assembly]) -> Result<&Self, DIError> {
        for (index, assembly) in assemblies.iter().enumerate() {
            assembly.assemble(&self.container)?;
            debug!(
                "Applied assembly #{} to container '{}'",
                index,
                self.container.name()
            );
        }
        Ok(self)
    }

    pub fn container(&self) -> &DIContainer {
        &self.container
    }

    pub fn resolver(&self) -> Resolver {
        self.container.resolver()
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}
