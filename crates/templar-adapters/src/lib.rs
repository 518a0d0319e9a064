//! Infrastructure adapters for Templar.
//!
//! This crate implements the ports defined in `templar-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod dotnet;
pub mod exclusion;
pub mod output;
pub mod source;

// Re-export commonly used adapters
pub use dotnet::DotNetMetadataMapper;
pub use exclusion::FileExcluder;
pub use output::LocalOutput;
pub use source::{InMemorySource, LocalTemplateSource};
