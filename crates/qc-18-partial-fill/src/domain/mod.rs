//! # Domain Module
//!
//! Core domain types for partial-fill coordination.

pub mod config;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use config::CoordinatorConfig;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
