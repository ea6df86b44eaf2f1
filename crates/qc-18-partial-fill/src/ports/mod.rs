//! # Ports Module
//!
//! Hexagonal architecture ports for partial-fill coordination.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
