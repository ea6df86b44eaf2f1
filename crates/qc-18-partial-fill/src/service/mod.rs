//! # Service Layer
//!
//! Implements `PartialFillApi` over the injected outbound ports.

pub mod coordinator;

pub use coordinator::PartialFillCoordinator;
