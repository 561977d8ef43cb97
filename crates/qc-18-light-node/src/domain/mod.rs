//! # Domain Module
//!
//! Core domain types for the Light Node.

pub mod entities;
pub mod errors;
pub mod events;
pub mod ids;
pub mod invariants;
pub mod registry;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use ids::*;
pub use invariants::*;
pub use registry::*;
pub use value_objects::*;
