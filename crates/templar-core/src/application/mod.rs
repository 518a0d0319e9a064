//! Application layer for Templar.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (MetadataService, RenderService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! rendering logic itself. All rendering rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{MetadataService, RenderService, Resolution};

// Re-export port types (for adapter implementation)
pub use ports::{ForeignMetadataMapper, TemplateRef, TemplateSource};

pub use error::ApplicationError;
