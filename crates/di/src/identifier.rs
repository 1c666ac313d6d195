//! Identifier - ключ реестра контейнера
//!
//! Составной ключ из `TypeId` и необязательного имени. `type_name` хранится
//! только для диагностики и в сравнении не участвует: две регистрации с
//! одинаковым строковым именем типа из разных модулей не конфликтуют.

use std::{
    any::{type_name, TypeId},
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Ключ регистрации: тип + необязательное имя
#[derive(Clone)]
pub struct Identifier {
    type_id: TypeId,
    name: Option<Arc<str>>,
    type_name: &'static str,
}

impl Identifier {
    /// Identifier без имени
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new::<T>(None)
    }

    /// Именованный identifier
    pub fn named<T: ?Sized + 'static>(name: impl Into<Arc<str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: Some(name.into()),
            type_name: type_name::<T>(),
        }
    }

    pub fn new<T: ?Sized + 'static>(name: Option<&str>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: name.map(Arc::from),
            type_name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Печатное имя типа (только для логов и ошибок)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}(\"{}\")", self.type_name, name),
            None => f.write_str(self.type_name),
        }
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identifier")
            .field("type", &self.type_name)
            .field("name", &self.name)
            .finish()
    }
}
