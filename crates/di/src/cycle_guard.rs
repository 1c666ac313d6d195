//! Опциональная диагностика циклов
//!
//! Стек разрешения живёт в thread-local и ведётся только когда это включено
//! конфигурацией (`CycleDetection`). Без стека фабрика, разрешающая свой же
//! identifier, рекурсирует без ограничений (для singleton - блокируется на
//! собственном `OnceCell`). Async путь стек не ведёт.
//!
//! Запись стека - конкретная cell, а не только identifier: дочерний
//! контейнер может декорировать одноимённую регистрацию родителя, и это не цикл.

use std::cell::{Cell, RefCell};
use std::ptr;
use tracing::warn;

use crate::{
    cell::ServiceCell, container_configuration::CycleDetection, errors::DIError,
    identifier::Identifier,
};

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<StackEntry>> = const { RefCell::new(Vec::new()) };
    static VALIDATION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Пока жив, текущий поток считается находящимся внутри `validate()`
pub(crate) struct ValidationScope {
    _private: (),
}

impl ValidationScope {
    pub(crate) fn enter() -> Self {
        VALIDATION_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self { _private: () }
    }

    fn is_active() -> bool {
        VALIDATION_DEPTH.with(|depth| depth.get() > 0)
    }
}

impl Drop for ValidationScope {
    fn drop(&mut self) {
        VALIDATION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Адрес cell используется только для сравнения и не разыменовывается
struct StackEntry {
    cell: *const ServiceCell,
    id: Identifier,
}

/// RAII запись в стеке разрешения
pub(crate) struct ResolutionGuard {
    tracked: bool,
}

impl ResolutionGuard {
    pub(crate) fn enter(
        cell: &ServiceCell,
        mode: CycleDetection,
        max_depth: usize,
    ) -> Result<Self, DIError> {
        let tracked = match mode {
            CycleDetection::Off => false,
            CycleDetection::ValidationOnly => ValidationScope::is_active(),
            CycleDetection::Always => true,
        };
        if !tracked {
            return Ok(Self { tracked: false });
        }

        let id = cell.id();
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            if stack.iter().any(|entry| ptr::eq(entry.cell, cell)) {
                let chain: Vec<String> = stack
                    .iter()
                    .map(|entry| entry.id.to_string())
                    .chain(std::iter::once(id.to_string()))
                    .collect();
                warn!("Circular dependency: {}", chain.join(" -> "));
                return Err(DIError::circular(id, chain));
            }

            if stack.len() >= max_depth {
                return Err(DIError::depth_exceeded(id, stack.len() + 1));
            }

            stack.push(StackEntry {
                cell: cell as *const ServiceCell,
                id: id.clone(),
            });
            Ok(Self { tracked: true })
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        if self.tracked {
            RESOLUTION_STACK.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }
}
