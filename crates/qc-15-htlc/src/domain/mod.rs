//! # Domain Module
//!
//! Core domain types for HTLC spend construction.

pub mod config;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod secure_secret;
pub mod value_objects;

pub use config::{FeeModel, HtlcConfig};
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use secure_secret::SecureSecret;
pub use value_objects::*;
