//! # Algorithms Module
//!
//! Pure functions: fee estimation, secret handling, HTLC scripts.

pub mod fee;
pub mod script;
pub mod secret;

pub use fee::{estimate_fee, FeeEstimator};
pub use script::{build_htlc_script, decode_instructions, extract_commitment, htlc_address};
pub use secret::{
    generate_random_secret, generate_secrets, hash160, secret_fingerprint, sha256, verify_secret,
};
