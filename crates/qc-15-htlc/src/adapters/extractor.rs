//! Script commitment extractors.

use crate::algorithms::extract_commitment;
use crate::domain::{CommitmentCheck, HtlcError};
use crate::ports::ScriptCommitmentExtractor;
use bitcoin::Script;

/// Production extractor: the script must be a standard HTLC.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHtlcExtractor;

impl ScriptCommitmentExtractor for StandardHtlcExtractor {
    fn extract(&self, script: &Script) -> Result<CommitmentCheck, HtlcError> {
        extract_commitment(script).map(CommitmentCheck::Verify)
    }

    fn name(&self) -> &'static str {
        "standard-htlc"
    }
}

/// Accepts any script and skips secret verification.
///
/// NON-PRODUCTION. Only for placeholder scripts in tests and demos.
#[cfg(any(test, feature = "unchecked-scripts"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct UncheckedCommitmentExtractor;

#[cfg(any(test, feature = "unchecked-scripts"))]
impl ScriptCommitmentExtractor for UncheckedCommitmentExtractor {
    fn extract(&self, script: &Script) -> Result<CommitmentCheck, HtlcError> {
        tracing::warn!(
            "[qc-15] secret verification SKIPPED for {}-byte script (unchecked extractor)",
            script.len()
        );
        Ok(CommitmentCheck::Skip)
    }

    fn name(&self) -> &'static str {
        "unchecked"
    }
}
