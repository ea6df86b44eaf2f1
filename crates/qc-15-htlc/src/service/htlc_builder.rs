//! # HTLC Transaction Builder
//!
//! Builds signed redeem and refund spends of HTLC outputs.
//!
//! ## Per-UTXO state machine
//!
//! ```text
//! Unspent ──redeem/refund──→ Spent
//!                              │
//!                              └── refund fee bump (unconfirmed, replaceable): stays Spent
//! ```
//!
//! The final mark is a check-and-set on the injected `SpendLedger`, so of
//! any number of concurrent attempts on one outpoint exactly one wins.

use std::str::FromStr;
use std::sync::Arc;

use bitcoin::address::NetworkUnchecked;
use bitcoin::hashes::Hash as _;
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{
    absolute, transaction, Address, Amount, Network, OutPoint, PublicKey, Script, ScriptBuf,
    Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};
use tracing::{debug, info, warn};

use crate::algorithms::{decode_instructions, FeeEstimator};
use crate::domain::{
    invariant_above_dust, invariant_locktime_expired, invariant_secret_format,
    invariant_timestamp_locktime, CommitmentCheck, HtlcConfig, HtlcError, HtlcSpend, OutPointKey,
    RedeemParams, RefundParams, SecureSecret, SpendKind, SpendRecord, Utxo, UtxoState,
};
use crate::metrics::HtlcMetrics;
use crate::ports::{
    HtlcSpendApi, ScriptCommitmentExtractor, SpendLedger, TimeSource, TransactionSigner,
};

/// Builds redeem/refund spends against HTLC outputs.
pub struct HtlcTransactionBuilder {
    config: HtlcConfig,
    fees: FeeEstimator,
    ledger: Arc<dyn SpendLedger>,
    clock: Arc<dyn TimeSource>,
    extractor: Arc<dyn ScriptCommitmentExtractor>,
    signer: Arc<dyn TransactionSigner>,
    metrics: Arc<HtlcMetrics>,
}

/// Shape of the single-input, single-output spend.
struct SpendShape<'a> {
    utxo: &'a Utxo,
    destination: ScriptBuf,
    amount: u64,
    lock_time: absolute::LockTime,
    sequence: Sequence,
}

impl HtlcTransactionBuilder {
    /// Create a builder with default configuration.
    pub fn new(
        ledger: Arc<dyn SpendLedger>,
        clock: Arc<dyn TimeSource>,
        extractor: Arc<dyn ScriptCommitmentExtractor>,
        signer: Arc<dyn TransactionSigner>,
    ) -> Self {
        let config = HtlcConfig::default();
        Self {
            fees: FeeEstimator::new(config.fee_model, config.min_fee_rate),
            config,
            ledger,
            clock,
            extractor,
            signer,
            metrics: Arc::new(HtlcMetrics::new()),
        }
    }

    /// Create a builder with custom configuration.
    pub fn with_config(
        config: HtlcConfig,
        ledger: Arc<dyn SpendLedger>,
        clock: Arc<dyn TimeSource>,
        extractor: Arc<dyn ScriptCommitmentExtractor>,
        signer: Arc<dyn TransactionSigner>,
    ) -> Result<Self, HtlcError> {
        config.validate()?;
        Ok(Self {
            fees: FeeEstimator::new(config.fee_model, config.min_fee_rate),
            config,
            ledger,
            clock,
            extractor,
            signer,
            metrics: Arc::new(HtlcMetrics::new()),
        })
    }

    /// Share a metrics collector with other components.
    pub fn with_metrics(mut self, metrics: Arc<HtlcMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Builder counters.
    pub fn metrics(&self) -> &HtlcMetrics {
        &self.metrics
    }

    /// The fee estimator in use.
    pub fn fee_estimator(&self) -> &FeeEstimator {
        &self.fees
    }

    /// Structural UTXO checks. Returns the parsed funding txid.
    fn validate_utxo(&self, utxo: &Utxo, htlc_script: &Script) -> Result<Txid, HtlcError> {
        if utxo.txid.len() != 64 {
            return Err(HtlcError::InvalidUtxo(format!(
                "txid must be 64 hex characters, got {}",
                utxo.txid.len()
            )));
        }
        let txid = Txid::from_str(&utxo.txid)
            .map_err(|e| HtlcError::InvalidUtxo(format!("txid: {e}")))?;
        if utxo.value == 0 {
            return Err(HtlcError::InvalidUtxo("value must be positive".into()));
        }
        if utxo.script_pubkey.is_empty() {
            return Err(HtlcError::InvalidUtxo("empty locking script".into()));
        }
        decode_instructions(&utxo.script_pubkey)
            .map_err(|e| HtlcError::InvalidUtxo(format!("locking script: {e}")))?;
        if utxo.script_pubkey.is_p2wsh()
            && utxo.script_pubkey != ScriptBuf::new_p2wsh(&htlc_script.wscript_hash())
        {
            return Err(HtlcError::InvalidUtxo(
                "locking script does not commit to the HTLC script".into(),
            ));
        }
        Ok(txid)
    }

    fn ensure_unspent(&self, key: &OutPointKey) -> Result<(), HtlcError> {
        if self.ledger.state(key).is_terminal() {
            return Err(self.already_spent(key));
        }
        Ok(())
    }

    fn already_spent(&self, key: &OutPointKey) -> HtlcError {
        self.metrics.record_double_spend();
        debug!("[qc-15] rejected spend of {}: already spent", key);
        HtlcError::UtxoAlreadySpent(key.to_string())
    }

    /// Fee at `fee_rate` for a 1-in/1-out spend and the remaining output value.
    fn fee_and_output(&self, value: u64, fee_rate: u64) -> Result<(u64, u64), HtlcError> {
        let fee = self.fees.estimate_fee(1, 1, fee_rate)?;
        let output = value.saturating_sub(fee);
        invariant_above_dust(output, self.config.dust_threshold)?;
        Ok((fee, output))
    }

    fn parse_address(address: &str, network: Network) -> Result<Address, HtlcError> {
        address
            .parse::<Address<NetworkUnchecked>>()
            .map_err(|e| HtlcError::InvalidAddress(format!("{address}: {e}")))?
            .require_network(network)
            .map_err(|e| HtlcError::InvalidAddress(format!("{address}: {e}")))
    }

    fn unsigned_transaction(txid: Txid, shape: &SpendShape<'_>) -> Transaction {
        Transaction {
            version: transaction::Version::TWO,
            lock_time: shape.lock_time,
            input: vec![TxIn {
                previous_output: OutPoint {
                    txid,
                    vout: shape.utxo.vout,
                },
                script_sig: ScriptBuf::new(),
                sequence: shape.sequence,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(shape.amount),
                script_pubkey: shape.destination.clone(),
            }],
        }
    }

    /// Sign input 0 under the P2WSH (segwit v0) sighash.
    fn sign_input(
        &self,
        tx: &Transaction,
        htlc_script: &Script,
        value: u64,
        key: &PublicKey,
    ) -> Result<Vec<u8>, HtlcError> {
        let sighash = SighashCache::new(tx)
            .p2wsh_signature_hash(0, htlc_script, Amount::from_sat(value), EcdsaSighashType::All)
            .map_err(|e| HtlcError::SigningFailed(format!("sighash: {e}")))?;
        self.signer.sign(&sighash.to_byte_array(), key)
    }

    fn now_secs(&self) -> u64 {
        self.clock.now() / 1000
    }
}

impl HtlcSpendApi for HtlcTransactionBuilder {
    fn build_redeem_transaction(&self, params: RedeemParams) -> Result<HtlcSpend, HtlcError> {
        let utxo = &params.utxo;
        let key = utxo.key();

        let txid = self.validate_utxo(utxo, &params.htlc_script)?;
        invariant_above_dust(utxo.value, self.config.dust_threshold)?;
        let secret = SecureSecret::new(invariant_secret_format(&params.secret)?);
        self.ensure_unspent(&key)?;

        match self.extractor.extract(&params.htlc_script)? {
            CommitmentCheck::Verify(commitment) => {
                if !commitment.matches(secret.as_bytes()) {
                    self.metrics.record_secret_mismatch();
                    warn!("[qc-15] secret mismatch on redeem of {}", key);
                    return Err(HtlcError::SecretMismatch);
                }
            }
            CommitmentCheck::Skip => {}
        }

        let fee_rate = self.config.default_fee_rate;
        let (fee, output_amount) = self.fee_and_output(utxo.value, fee_rate)?;
        let destination = Self::parse_address(&params.redeem_address, params.network)?;

        let shape = SpendShape {
            utxo,
            destination: destination.script_pubkey(),
            amount: output_amount,
            lock_time: absolute::LockTime::ZERO,
            sequence: Sequence::MAX,
        };
        let mut tx = Self::unsigned_transaction(txid, &shape);
        let signature = self.sign_input(&tx, &params.htlc_script, utxo.value, &params.receiver_key)?;

        let mut witness = Witness::new();
        witness.push(signature);
        witness.push(secret.as_bytes());
        witness.push(params.htlc_script.as_bytes());
        tx.input[0].witness = witness;

        let spend_txid = tx.compute_txid().to_string();
        let record = SpendRecord {
            kind: SpendKind::Redeem,
            txid: spend_txid.clone(),
            replaceable: false,
            confirmed: false,
            recorded_at: self.clock.now(),
        };
        if self.ledger.try_mark_spent(key.clone(), record).is_err() {
            return Err(self.already_spent(&key));
        }

        self.metrics.record_redeem();
        info!(
            "[qc-15] redeem {} spends {} (fee={}, out={})",
            spend_txid, key, fee, output_amount
        );

        Ok(HtlcSpend {
            transaction: tx,
            txid: spend_txid,
            kind: SpendKind::Redeem,
            fee,
            output_amount,
            fee_rate,
            replaces: None,
        })
    }

    fn build_refund_transaction(&self, params: RefundParams) -> Result<HtlcSpend, HtlcError> {
        let utxo = &params.utxo;
        let key = utxo.key();

        let txid = self.validate_utxo(utxo, &params.htlc_script)?;
        invariant_above_dust(utxo.value, self.config.dust_threshold)?;
        invariant_timestamp_locktime(params.locktime)?;
        invariant_locktime_expired(self.now_secs(), u64::from(params.locktime))?;

        match &params.replaces {
            None => self.ensure_unspent(&key)?,
            Some(previous) => {
                let current = self.ledger.record(&key).ok_or_else(|| {
                    HtlcError::InvalidReplacement(format!("no refund recorded for {key}"))
                })?;
                if !current.is_replaceable_refund() || !current.txid.eq_ignore_ascii_case(previous)
                {
                    return Err(HtlcError::InvalidReplacement(format!(
                        "{previous} is not an unconfirmed replaceable refund of {key}"
                    )));
                }
            }
        }

        // Refunds carry no secret; this only rejects scripts the extractor cannot read.
        self.extractor.extract(&params.htlc_script)?;

        let fee_rate = if params.replaces.is_some() {
            self.config.replacement_fee_rate
        } else {
            self.config.default_fee_rate
        };
        let (fee, output_amount) = self.fee_and_output(utxo.value, fee_rate)?;
        let destination = Self::parse_address(&params.refund_address, params.network)?;

        let sequence = if params.enable_replacement {
            Sequence::ENABLE_RBF_NO_LOCKTIME
        } else {
            Sequence::ENABLE_LOCKTIME_NO_RBF
        };
        let shape = SpendShape {
            utxo,
            destination: destination.script_pubkey(),
            amount: output_amount,
            lock_time: absolute::LockTime::from_consensus(params.locktime),
            sequence,
        };
        let mut tx = Self::unsigned_transaction(txid, &shape);
        let signature = self.sign_input(&tx, &params.htlc_script, utxo.value, &params.sender_key)?;

        let mut witness = Witness::new();
        witness.push(signature);
        witness.push(params.htlc_script.as_bytes());
        tx.input[0].witness = witness;

        let spend_txid = tx.compute_txid().to_string();
        let record = SpendRecord {
            kind: SpendKind::Refund,
            txid: spend_txid.clone(),
            replaceable: params.enable_replacement,
            confirmed: false,
            recorded_at: self.clock.now(),
        };

        match &params.replaces {
            None => {
                if self.ledger.try_mark_spent(key.clone(), record).is_err() {
                    return Err(self.already_spent(&key));
                }
            }
            Some(previous) => self.ledger.try_replace(&key, previous, record)?,
        }

        self.metrics.record_refund(params.replaces.is_some());
        info!(
            "[qc-15] refund {} spends {} (fee={}, rbf={}, replaces={:?})",
            spend_txid, key, fee, params.enable_replacement, params.replaces
        );

        Ok(HtlcSpend {
            transaction: tx,
            txid: spend_txid,
            kind: SpendKind::Refund,
            fee,
            output_amount,
            fee_rate,
            replaces: params.replaces,
        })
    }

    fn confirm_spend(&self, key: &OutPointKey) -> Result<(), HtlcError> {
        self.ledger.mark_confirmed(key)?;
        debug!("[qc-15] spend of {} confirmed", key);
        Ok(())
    }

    fn spend_state(&self, key: &OutPointKey) -> UtxoState {
        self.ledger.state(key)
    }
}
