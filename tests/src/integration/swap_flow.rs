//! # End-to-End Swap Flow
//!
//! ```text
//! [SecretManager (15)] ──generate/hash/store──→ secrets + hash160s
//!          │
//!          ↓
//! build_htlc_script per partial order ──→ P2WSH funding outputs
//!          │
//!          ↓
//! [PartialFillCoordinator (18)] ──create_order(secret_hashes)──→ assign ──→ execute(secret)
//!          │
//!          ↓
//! [HtlcTransactionBuilder (15)] ──redeem with revealed secret / refund after locktime
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bitcoin::secp256k1::SecretKey;
    use bitcoin::{absolute, Network, PublicKey, ScriptBuf, Sequence};

    use qc_15_htlc::{
        build_htlc_script, htlc_address, HashCommitment, HtlcError, HtlcScriptParams,
        HtlcSpendApi, HtlcTransactionBuilder, InMemorySecretStore, InMemorySpendLedger,
        LocalKeySigner, ManualTimeSource, OutPointKey, RedeemParams, RefundParams, SecretHash,
        SecretManager, SecretManagerApi, SecureSecret, SpendKind, StandardHtlcExtractor, Utxo,
        UtxoState,
    };
    use qc_18_partial_fill::{
        CreateOrderRequest, ExecutionOptions, FillError, InMemoryOrderStore, PartialFillApi,
        PartialFillCoordinator, ResolverPool,
    };

    use crate::init_tracing;

    const LOCKTIME: u32 = 1_700_000_000;
    const FUNDING_TXID: &str = "a1075db55d416d3ca199f55b6084e2115b9345e16c5cf302fc80e9d5fbf5d48d";
    const OUTPUT_VALUE: u64 = 250_000;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Swap {
        clock: Arc<ManualTimeSource>,
        secrets: SecretManager,
        coordinator: PartialFillCoordinator,
        builder: HtlcTransactionBuilder,
        receiver: PublicKey,
        sender: PublicKey,
        payout: String,
    }

    fn key(seed: u8) -> SecretKey {
        SecretKey::from_slice(&[seed; 32]).unwrap()
    }

    fn swap() -> Swap {
        init_tracing();
        let clock = Arc::new(ManualTimeSource::new(u64::from(LOCKTIME - 3600) * 1000));
        let signer = Arc::new(LocalKeySigner::new());
        let receiver = signer.add_key(key(0x11));
        let sender = signer.add_key(key(0x22));

        let payout_key = signer.add_key(key(0x33));
        let payout = htlc_address(
            &build_htlc_script(&HtlcScriptParams {
                commitment: HashCommitment::Hash160([0; 20]),
                receiver_key: payout_key,
                sender_key: payout_key,
                locktime: LOCKTIME,
            })
            .unwrap(),
            Network::Regtest,
        )
        .to_string();

        Swap {
            secrets: SecretManager::new(Arc::new(InMemorySecretStore::new()), clock.clone()),
            coordinator: PartialFillCoordinator::new(
                Arc::new(InMemoryOrderStore::new()),
                Arc::new(ResolverPool::new(vec![
                    "resolver-a".into(),
                    "resolver-b".into(),
                ])),
                clock.clone(),
            ),
            builder: HtlcTransactionBuilder::new(
                Arc::new(InMemorySpendLedger::new()),
                clock.clone(),
                Arc::new(StandardHtlcExtractor),
                signer,
            ),
            clock,
            receiver,
            sender,
            payout,
        }
    }

    fn htlc_for(s: &Swap, hash: SecretHash) -> ScriptBuf {
        build_htlc_script(&HtlcScriptParams {
            commitment: HashCommitment::from(hash),
            receiver_key: s.receiver,
            sender_key: s.sender,
            locktime: LOCKTIME,
        })
        .unwrap()
    }

    fn funding(script: &ScriptBuf, vout: u32) -> Utxo {
        Utxo {
            txid: FUNDING_TXID.to_string(),
            vout,
            value: OUTPUT_VALUE,
            script_pubkey: htlc_address(script, Network::Regtest).script_pubkey(),
        }
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[test]
    fn test_secret_locked_partials_settle_on_chain() {
        let s = swap();

        let batch = s.secrets.generate_many(2).unwrap();
        let hashes = s.secrets.hash_all(&batch);
        s.secrets
            .store_with_expiration(&batch, &hashes, 24 * 3600 * 1000)
            .unwrap();
        let scripts: Vec<ScriptBuf> = hashes.iter().map(|h| htlc_for(&s, *h)).collect();

        let mut request = CreateOrderRequest::new(0.005, vec![0.0025, 0.0025]);
        request.secret_hashes = Some(hashes.clone());
        let order = s.coordinator.create_order(request).unwrap();
        let assignments = s.coordinator.assign_resolvers(&order.id).unwrap();
        assert_eq!(assignments.len(), 2);

        // Partial 0: resolver reveals the secret, then redeems the HTLC.
        let a0 = &assignments[0];
        assert!(matches!(
            s.coordinator.execute_partial_fill(
                &a0.partial_order_id,
                &a0.resolver_id,
                ExecutionOptions {
                    secret: Some(batch[1].clone()),
                    tx_reference: None,
                },
            ),
            Err(FillError::SecretMismatch(_))
        ));

        let spend = s
            .builder
            .build_redeem_transaction(RedeemParams {
                utxo: funding(&scripts[0], 0),
                secret: batch[0].to_hex(),
                receiver_key: s.receiver,
                redeem_address: s.payout.clone(),
                htlc_script: scripts[0].clone(),
                network: Network::Regtest,
            })
            .unwrap();
        assert_eq!(spend.kind, SpendKind::Redeem);
        assert_eq!(spend.fee, 1920);
        assert_eq!(spend.output_amount, OUTPUT_VALUE - 1920);
        let witness: Vec<&[u8]> = spend.transaction.input[0].witness.iter().collect();
        assert_eq!(witness[1], batch[0].as_bytes());

        let record = s
            .coordinator
            .execute_partial_fill(
                &a0.partial_order_id,
                &a0.resolver_id,
                ExecutionOptions {
                    secret: Some(batch[0].clone()),
                    tx_reference: Some(spend.txid.clone()),
                },
            )
            .unwrap();
        assert_eq!(record.tx_reference.as_deref(), Some(spend.txid.as_str()));

        // Partial 1: resolver disappears; sender refunds once the locktime passes.
        let a1 = &assignments[1];
        s.coordinator
            .mark_resolver_failed(&a1.partial_order_id, &a1.resolver_id)
            .unwrap();

        let refund = |enable_replacement: bool, replaces: Option<String>| RefundParams {
            utxo: funding(&scripts[1], 1),
            sender_key: s.sender,
            refund_address: s.payout.clone(),
            htlc_script: scripts[1].clone(),
            locktime: LOCKTIME,
            network: Network::Regtest,
            enable_replacement,
            replaces,
        };

        let early = s.builder.build_refund_transaction(refund(true, None)).unwrap_err();
        assert!(matches!(early, HtlcError::LocktimeNotExpired { .. }));
        assert!(early.is_retryable());

        s.clock.set(u64::from(LOCKTIME) * 1000);
        let original = s.builder.build_refund_transaction(refund(true, None)).unwrap();
        assert_eq!(
            original.transaction.lock_time,
            absolute::LockTime::from_consensus(LOCKTIME)
        );
        assert_eq!(
            original.transaction.input[0].sequence,
            Sequence::ENABLE_RBF_NO_LOCKTIME
        );

        let bumped = s
            .builder
            .build_refund_transaction(refund(true, Some(original.txid.clone())))
            .unwrap();
        assert_eq!(bumped.fee_rate, 15);
        assert!(bumped.fee > original.fee);

        let refunded = OutPointKey::new(FUNDING_TXID, 1);
        s.builder.confirm_spend(&refunded).unwrap();
        assert_eq!(s.builder.spend_state(&refunded), UtxoState::Spent);

        // The redeemed output cannot be refunded afterwards.
        assert!(matches!(
            s.builder.build_refund_transaction(RefundParams {
                utxo: funding(&scripts[0], 0),
                htlc_script: scripts[0].clone(),
                ..refund(false, None)
            }),
            Err(HtlcError::UtxoAlreadySpent(_))
        ));

        let progress = s.coordinator.get_progress(&order.id).unwrap();
        assert_eq!(progress.completed_parts, 1);
        assert_eq!(progress.completion_percentage, 50.0);
    }

    #[test]
    fn test_rotated_secret_relocks_partial() {
        let s = swap();

        let old = s.secrets.generate_many(1).unwrap();
        let old_hashes = s.secrets.hash_all(&old);
        s.secrets.store(&old, &old_hashes, None).unwrap();

        let new = vec![SecureSecret::new([0x42; 32])];
        let new_hashes = s.secrets.rotate(&old, &new, None).unwrap();
        assert!(!s.secrets.is_active(&old[0]));
        assert!(s.secrets.is_active(&new[0]));

        let mut request = CreateOrderRequest::new(1.0, vec![1.0]);
        request.secret_hashes = Some(new_hashes.clone());
        let order = s.coordinator.create_order(request).unwrap();
        let partial_id = order.partial_orders[0].id.clone();

        let with = |secret: &SecureSecret| ExecutionOptions {
            secret: Some(secret.clone()),
            tx_reference: None,
        };
        assert!(matches!(
            s.coordinator
                .execute_partial_fill(&partial_id, "resolver-a", with(&old[0])),
            Err(FillError::SecretMismatch(_))
        ));
        s.coordinator
            .execute_partial_fill(&partial_id, "resolver-a", with(&new[0]))
            .unwrap();

        // The script committed to the rotated hash only accepts the new secret.
        let script = htlc_for(&s, new_hashes[0]);
        let stale = s.builder.build_redeem_transaction(RedeemParams {
            utxo: funding(&script, 7),
            secret: old[0].to_hex(),
            receiver_key: s.receiver,
            redeem_address: s.payout.clone(),
            htlc_script: script.clone(),
            network: Network::Regtest,
        });
        assert_eq!(stale.unwrap_err(), HtlcError::SecretMismatch);
    }
}
