//! # HTLC Script Construction and Introspection
//!
//! ```text
//! OP_IF
//!     OP_SHA256|OP_HASH160 <hash> OP_EQUALVERIFY <receiver> OP_CHECKSIG
//! OP_ELSE
//!     <locktime> OP_CHECKLOCKTIMEVERIFY OP_DROP <sender> OP_CHECKSIG
//! OP_ENDIF
//! ```
//!
//! The committed hash is always the instruction at index 2.

use bitcoin::opcodes::all::{
    OP_CHECKSIG, OP_CLTV, OP_DROP, OP_ELSE, OP_ENDIF, OP_EQUALVERIFY, OP_HASH160, OP_IF, OP_SHA256,
};
use bitcoin::script::{Builder, Instruction};
use bitcoin::{Address, Network, Script, ScriptBuf};

use crate::domain::{invariant_timestamp_locktime, HashCommitment, HtlcError, HtlcScriptParams};

/// Position of the hash opcode.
pub const HASH_OPCODE_INDEX: usize = 1;
/// Position of the committed hash push.
pub const COMMITMENT_INDEX: usize = 2;

/// Build the witness script for an HTLC.
///
/// Fails when `locktime` would be read as a block height.
pub fn build_htlc_script(params: &HtlcScriptParams) -> Result<ScriptBuf, HtlcError> {
    invariant_timestamp_locktime(params.locktime)?;
    let builder = Builder::new().push_opcode(OP_IF);
    let builder = match params.commitment {
        HashCommitment::Sha256(hash) => builder.push_opcode(OP_SHA256).push_slice(hash),
        HashCommitment::Hash160(hash) => builder.push_opcode(OP_HASH160).push_slice(hash),
    };
    Ok(builder
        .push_opcode(OP_EQUALVERIFY)
        .push_key(&params.receiver_key)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ELSE)
        .push_int(i64::from(params.locktime))
        .push_opcode(OP_CLTV)
        .push_opcode(OP_DROP)
        .push_key(&params.sender_key)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ENDIF)
        .into_script())
}

/// P2WSH address paying to `script`.
pub fn htlc_address(script: &Script, network: Network) -> Address {
    Address::p2wsh(script, network)
}

/// Decode every instruction, failing on malformed pushes.
pub fn decode_instructions(script: &Script) -> Result<Vec<Instruction<'_>>, HtlcError> {
    script
        .instructions()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| HtlcError::UnrecognizedScript(e.to_string()))
}

/// Pull the hash commitment out of an HTLC witness script.
pub fn extract_commitment(script: &Script) -> Result<HashCommitment, HtlcError> {
    let instructions = decode_instructions(script)?;

    if instructions.first() != Some(&Instruction::Op(OP_IF)) {
        return Err(HtlcError::UnrecognizedScript(
            "script does not open with OP_IF".into(),
        ));
    }

    let pushed = match instructions.get(COMMITMENT_INDEX) {
        Some(Instruction::PushBytes(bytes)) => bytes.as_bytes(),
        _ => {
            return Err(HtlcError::UnrecognizedScript(format!(
                "no hash push at instruction {COMMITMENT_INDEX}"
            )))
        }
    };

    match instructions.get(HASH_OPCODE_INDEX) {
        Some(Instruction::Op(op)) if *op == OP_SHA256 => pushed
            .try_into()
            .map(HashCommitment::Sha256)
            .map_err(|_| HtlcError::UnrecognizedScript("SHA-256 commitment is not 32 bytes".into())),
        Some(Instruction::Op(op)) if *op == OP_HASH160 => pushed
            .try_into()
            .map(HashCommitment::Hash160)
            .map_err(|_| HtlcError::UnrecognizedScript("HASH160 commitment is not 20 bytes".into())),
        _ => Err(HtlcError::UnrecognizedScript(format!(
            "no hash opcode at instruction {HASH_OPCODE_INDEX}"
        ))),
    }
}
