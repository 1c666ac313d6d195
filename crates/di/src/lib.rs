//! Runtime DI контейнер
//!
//! Реестр `(тип, имя) -> фабрика` с кэшированием по lifetime, делегированием
//! к родительскому контейнеру, sync и async путями разрешения и eager
//! валидацией графа.
//!
//! ```rust
//! use di::{DIContainer, Lifetime};
//!
//! struct Widget;
//! struct Gadget {
//!     widget: std::sync::Arc<Widget>,
//! }
//!
//! let container = DIContainer::new();
//! container.register_transient(|_| Ok(Widget)).unwrap();
//! container
//!     .register(None, Lifetime::ContainerSingleton, |r| {
//!         Ok(Gadget { widget: r.resolve::<Widget>()? })
//!     })
//!     .unwrap();
//!
//! container.validate().expect("wiring is complete");
//! let gadget = container.resolve::<Gadget>().unwrap();
//! # let _ = &gadget.widget;
//! ```

pub mod assembly;
mod cell;
pub mod container;
pub mod container_configuration;
mod container_core;
pub mod container_metrics;
mod cycle_guard;
pub mod errors;
pub mod identifier;
pub mod lifetime;
pub mod resolver;
mod validation;

pub use assembly::{Assembler, Assembly};
pub use container::DIContainer;
pub use container_configuration::{ContainerConfig, CycleDetection};
pub use container_metrics::ContainerStats;
pub use errors::{DIError, ValidationError};
pub use identifier::Identifier;
pub use lifetime::Lifetime;
pub use resolver::Resolver;
