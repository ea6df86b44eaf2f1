//! # Adapters Layer
//!
//! In-process implementations of the outbound ports.

pub mod order_store;
pub mod resolver_pool;

pub use order_store::InMemoryOrderStore;
pub use resolver_pool::ResolverPool;
