//! # Domain Invariants
//!
//! Interop constants and the checks every spend path shares.

use bitcoin::absolute::LOCK_TIME_THRESHOLD;

use super::errors::HtlcError;

/// Minimum output value (satoshis) a relayed transaction may create.
pub const DUST_THRESHOLD: u64 = 546;

/// Minimum fee rate (units per byte).
pub const MIN_FEE_RATE: u64 = 1;

/// Fee rate for first-time spends.
pub const DEFAULT_FEE_RATE: u64 = 10;

/// Fee rate for fee-bump replacements.
pub const REPLACEMENT_FEE_RATE: u64 = 15;

/// Upper bound on secrets produced by a single batch.
pub const MAX_SECRETS_PER_BATCH: usize = 1000;

/// Raw secret length in bytes.
pub const SECRET_LEN: usize = 32;

/// Hex-encoded secret length.
pub const SECRET_HEX_LEN: usize = SECRET_LEN * 2;

/// Invariant: value must not be dust.
pub fn invariant_above_dust(value: u64, threshold: u64) -> Result<(), HtlcError> {
    if value < threshold {
        return Err(HtlcError::BelowDustThreshold { value, threshold });
    }
    Ok(())
}

/// Invariant: secret is exactly 64 hex characters.
///
/// Returns the decoded bytes on success.
pub fn invariant_secret_format(secret: &str) -> Result<[u8; SECRET_LEN], HtlcError> {
    if secret.len() != SECRET_HEX_LEN {
        return Err(HtlcError::InvalidSecretFormat);
    }
    let mut out = [0u8; SECRET_LEN];
    hex::decode_to_slice(secret, &mut out).map_err(|_| HtlcError::InvalidSecretFormat)?;
    Ok(out)
}

/// Invariant: the locktime is a unix timestamp.
///
/// Consensus reads values below 500,000,000 as block heights, which the
/// wall-clock expiry check cannot compare against.
pub fn invariant_timestamp_locktime(locktime: u32) -> Result<(), HtlcError> {
    if locktime < LOCK_TIME_THRESHOLD {
        return Err(HtlcError::InvalidParameter(format!(
            "locktime {locktime} is a block height; expected unix seconds >= {LOCK_TIME_THRESHOLD}"
        )));
    }
    Ok(())
}

/// Invariant: the absolute locktime (unix seconds) has been reached.
pub fn invariant_locktime_expired(now_secs: u64, locktime: u64) -> Result<(), HtlcError> {
    if now_secs < locktime {
        return Err(HtlcError::LocktimeNotExpired {
            now: now_secs,
            locktime,
        });
    }
    Ok(())
}
