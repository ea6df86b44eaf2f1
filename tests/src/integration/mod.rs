//! Cross-subsystem integration tests.

pub mod concurrency;
pub mod scenarios;
pub mod swap_flow;
