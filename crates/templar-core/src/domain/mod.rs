// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Templar.
//!
//! This module contains pure rendering logic with no I/O of any kind.
//! Template fetching, file filtering, and output writing are handled via
//! ports (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: domain logic is synchronous
//! - **No I/O**: no filesystem, network, or external calls
//! - **Immutable values**: files and metadata are never mutated in place
//! - **Confinement**: a [`TagEnvironment`] belongs to one render call;
//!   distinct calls with distinct environments may run in parallel freely
//!
// Public API - what the world sees
pub mod environment;
pub mod error;
pub mod expr;
pub mod file;
pub mod metadata;
pub mod render;
pub mod resolver;

// Re-exports for convenience
pub use environment::{LOWER_SUFFIX, TagEnvironment, TagValue, UPPER_SUFFIX};
pub use error::{DomainError, ErrorCategory};
pub use file::TemplateFile;
pub use metadata::{ComputedTag, ConditionalTag, Tag, TemplateMetadata};
