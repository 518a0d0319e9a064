//! Template source adapters.
//!
//! Implementations of `templar_core::application::ports::TemplateSource`:
//! a local-directory source for production and an in-memory source for tests.

pub mod local;
pub mod memory;

pub use local::LocalTemplateSource;
pub use memory::InMemorySource;
