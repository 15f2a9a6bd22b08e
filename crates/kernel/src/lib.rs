//! Shared building blocks for Libris: settings, identifiers, and the module lifecycle.

pub mod ids;
pub mod module;
pub mod registry;
pub mod settings;

pub use ids::{BookId, UserId};
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
