//! # Service Layer
//!
//! Implements the inbound APIs over the injected outbound ports.

pub mod htlc_builder;
pub mod secret_manager;

pub use htlc_builder::HtlcTransactionBuilder;
pub use secret_manager::SecretManager;
