//! # Ports Module
//!
//! Hexagonal architecture ports for HTLC spend construction.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
