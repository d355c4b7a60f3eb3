//! Domain types and DTOs
//!
//! These types define the data structures flowing through the estimation
//! pipeline and the request/response bodies of the HTTP surface.

pub mod ai;
pub mod brand;
pub mod currency;
pub mod estimate;
pub mod project;

// Re-export commonly used types
pub use brand::*;
pub use estimate::*;
pub use project::*;

// AI types are accessed via crate::domain::ai:: to avoid namespace pollution
