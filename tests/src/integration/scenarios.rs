//! # Order and Secret Scenarios
//!
//! Drives the public APIs of both subsystems the way swap orchestration
//! does, with a manual clock.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use qc_15_htlc::{
        estimate_fee, InMemorySecretStore, ManualTimeSource, SecretManager, SecretManagerApi,
    };
    use qc_18_partial_fill::{
        CreateOrderRequest, ExecutionOptions, FillError, InMemoryOrderStore, OrderStatus,
        PartialFillApi, PartialFillCoordinator, PartialOrderStatus, ResolverPool,
    };

    use crate::init_tracing;

    // =============================================================================
    // FIXTURES
    // =============================================================================

    fn coordinator(clock: Arc<ManualTimeSource>) -> PartialFillCoordinator {
        PartialFillCoordinator::new(
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(ResolverPool::ephemeral()),
            clock,
        )
    }

    fn secret_manager(clock: Arc<ManualTimeSource>) -> SecretManager {
        SecretManager::new(Arc::new(InMemorySecretStore::new()), clock)
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[test]
    fn test_three_way_split_fills_completely() {
        init_tracing();
        let clock = Arc::new(ManualTimeSource::new(0));
        let c = coordinator(clock);

        let order = c
            .create_order(CreateOrderRequest::new(1.0, vec![0.3, 0.4, 0.3]))
            .unwrap();
        let assignments = c.assign_resolvers(&order.id).unwrap();

        assert_eq!(assignments.len(), 3);
        let resolvers: HashSet<_> = assignments.iter().map(|a| &a.resolver_id).collect();
        assert_eq!(resolvers.len(), 3);
        assert!(resolvers.iter().all(|r| r.starts_with("resolver_")));

        for a in &assignments {
            c.execute_partial_fill(&a.partial_order_id, &a.resolver_id, ExecutionOptions::default())
                .unwrap();
        }

        let progress = c.get_progress(&order.id).unwrap();
        assert_eq!(progress.total_parts, 3);
        assert_eq!(progress.completed_parts, 3);
        assert_eq!(progress.completion_percentage, 100.0);

        let done = c.mark_complete(&order.id).unwrap();
        assert_eq!(done.status, OrderStatus::Completed);
    }

    #[test]
    fn test_secret_batch_hashes_are_forty_hex() {
        init_tracing();
        let clock = Arc::new(ManualTimeSource::new(0));
        let m = secret_manager(clock);

        let secrets = m.generate_many(3).unwrap();
        let hashes = m.hash_all(&secrets);
        assert_eq!(hashes.len(), 3);
        for (secret, hash) in secrets.iter().zip(&hashes) {
            let hex = hash.to_hex();
            assert_eq!(hex.len(), 40);
            assert!(hex.chars().all(|ch| ch.is_ascii_hexdigit()));
            assert!(m.validate(secret, hash));
        }
    }

    #[test]
    fn test_stored_secrets_expire() {
        init_tracing();
        let clock = Arc::new(ManualTimeSource::new(5_000));
        let m = secret_manager(clock.clone());

        let secrets = m.generate_many(3).unwrap();
        let hashes = m.hash_all(&secrets);
        m.store_with_expiration(&secrets, &hashes, 1000).unwrap();
        assert_eq!(
            m.lookup_hashes(&secrets),
            hashes.iter().cloned().map(Some).collect::<Vec<_>>()
        );

        clock.advance(1100);
        assert_eq!(m.lookup_hashes(&secrets), vec![None, None, None]);
    }

    #[test]
    fn test_failed_modify_keeps_sum_invariant() {
        init_tracing();
        let clock = Arc::new(ManualTimeSource::new(0));
        let c = coordinator(clock);
        let order = c
            .create_order(CreateOrderRequest::new(10.0, vec![2.5, 2.5, 5.0]))
            .unwrap();

        let err = c.modify_order(&order.id, vec![4.0, 4.0]).unwrap_err();
        assert!(matches!(err, FillError::AmountMismatch { .. }));

        let after = c.get_order(&order.id).unwrap();
        let sum: f64 = after.partial_orders.iter().map(|p| p.amount).sum();
        assert!((sum - after.total_amount).abs() <= 1e-6);
        assert_eq!(after, order);
    }

    #[test]
    fn test_resolver_failure_round_trip() {
        init_tracing();
        let clock = Arc::new(ManualTimeSource::new(0));
        let c = coordinator(clock.clone());
        let order = c
            .create_order(CreateOrderRequest::new(2.0, vec![1.0, 1.0]))
            .unwrap();
        let assignments = c.assign_resolvers(&order.id).unwrap();
        let first = &assignments[0];

        clock.advance(30_000);
        c.mark_resolver_failed(&first.partial_order_id, &first.resolver_id)
            .unwrap();
        let second = c.reassign_failed_resolver(&first.partial_order_id).unwrap();
        assert_ne!(second.resolver_id, first.resolver_id);

        c.execute_partial_fill(
            &second.partial_order_id,
            &second.resolver_id,
            ExecutionOptions::default(),
        )
        .unwrap();

        let analytics = c.get_analytics(&order.id).unwrap();
        assert_eq!(analytics.completed_parts, 1);
        assert_eq!(analytics.assigned_parts, 1);
        assert_eq!(analytics.reassignments, 1);
        assert_eq!(analytics.unique_resolvers, 3);
        assert_eq!(analytics.fill_ratio, 0.5);

        let order = c.get_order(&order.id).unwrap();
        let partial = order.partial(&first.partial_order_id).unwrap();
        assert_eq!(partial.status, PartialOrderStatus::Completed);
        assert_eq!(partial.failed_resolvers, vec![first.resolver_id.clone()]);
    }

    #[test]
    fn test_cancelled_order_rejects_everything() {
        init_tracing();
        let clock = Arc::new(ManualTimeSource::new(0));
        let c = coordinator(clock);
        let order = c
            .create_order(CreateOrderRequest::new(1.0, vec![1.0]))
            .unwrap();
        c.cancel_order(&order.id).unwrap();

        assert!(matches!(
            c.modify_order(&order.id, vec![1.0]),
            Err(FillError::OrderTerminal { .. })
        ));
        assert!(matches!(
            c.assign_resolvers(&order.id),
            Err(FillError::OrderTerminal { .. })
        ));
        assert!(matches!(
            c.mark_complete(&order.id),
            Err(FillError::OrderTerminal { .. })
        ));
    }

    #[test]
    fn test_reference_fee_estimate() {
        assert_eq!(estimate_fee(1, 1, 10).unwrap(), 1920);
        assert_eq!(estimate_fee(2, 2, 1).unwrap(), 10 + 2 * 148 + 2 * 34);
    }
}
