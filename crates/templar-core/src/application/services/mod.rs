//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "load template metadata" or "resolve and render".

pub mod metadata_service;
pub mod render_service;

pub use metadata_service::MetadataService;
pub use render_service::{RenderService, Resolution};
