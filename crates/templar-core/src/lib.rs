//! Templar Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Templar
//! project scaffolding tool, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          templar-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   (MetadataService, RenderService)      │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (TemplateSource, ForeignMetadataMapper)│
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    templar-adapters (Infrastructure)    │
//! │  (LocalTemplateSource, FileExcluder,    │
//! │   DotNetMetadataMapper, LocalOutput)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Domain Layer (Pure Logic)         │
//! │  (TemplateMetadata, TagEnvironment,     │
//! │   expression evaluator, renderer)       │
//! │        No Filesystem, No Network        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use templar_core::domain::{render, TagEnvironment, TagValue, TemplateFile};
//!
//! let files = vec![TemplateFile::new("greeting.txt", "Hello firstName!")];
//!
//! let mut env = TagEnvironment::new();
//! env.insert("firstName", TagValue::from("Ada"));
//!
//! let rendered = render::render(&files, &env, None).unwrap();
//! assert_eq!(rendered[0].content, "Hello Ada!");
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        MetadataService, RenderService, Resolution, TemplateRef,
        ports::{ForeignMetadataMapper, TemplateSource},
    };
    pub use crate::domain::{
        ComputedTag, ConditionalTag, Tag, TagEnvironment, TagValue, TemplateFile,
        TemplateMetadata, render, resolver,
    };
    pub use crate::error::{TemplarError, TemplarResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
