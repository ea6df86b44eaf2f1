//! # Concurrency Tests
//!
//! Resolvers racing for partial orders and callers generating secrets in
//! parallel. Exactly one execution may win each partial order.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use rand::seq::SliceRandom;
    use tokio::sync::Barrier;

    use qc_15_htlc::{InMemorySecretStore, ManualTimeSource, SecretManager, SecretManagerApi};
    use qc_18_partial_fill::{
        CreateOrderRequest, ExecutionOptions, FillError, InMemoryOrderStore, PartialFillApi,
        PartialFillCoordinator, ResolverPool,
    };

    use crate::init_tracing;

    fn coordinator() -> Arc<PartialFillCoordinator> {
        Arc::new(PartialFillCoordinator::new(
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(ResolverPool::ephemeral()),
            Arc::new(ManualTimeSource::new(0)),
        ))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_execution_has_single_winner() {
        init_tracing();
        const RACERS: usize = 32;

        let c = coordinator();
        let order = c
            .create_order(CreateOrderRequest::new(1.0, vec![0.5, 0.5]))
            .unwrap();
        let target = order.partial_orders[1].id.clone();
        let barrier = Arc::new(Barrier::new(RACERS));

        let handles: Vec<_> = (0..RACERS)
            .map(|i| {
                let c = c.clone();
                let target = target.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    c.execute_partial_fill(
                        &target,
                        &format!("racer-{i}"),
                        ExecutionOptions::default(),
                    )
                })
            })
            .collect();

        let mut winners = Vec::new();
        let mut already_executed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(record) => winners.push(record.resolver_id),
                Err(FillError::AlreadyExecuted(id)) => {
                    assert_eq!(id, target);
                    already_executed += 1;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(already_executed, RACERS - 1);

        let order = c.get_order(&order.id).unwrap();
        let executed = order.partial(&target).unwrap().execution.as_ref().unwrap();
        assert_eq!(executed.resolver_id, winners[0]);
        assert_eq!(c.metrics().snapshot().partial_fills_executed, 1);
        assert_eq!(
            c.metrics().snapshot().execution_races_lost,
            (RACERS - 1) as u64
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_independent_partials_execute_in_parallel() {
        init_tracing();
        let c = coordinator();
        let amounts = vec![0.1; 10];
        let order = c
            .create_order(CreateOrderRequest::new(1.0, amounts))
            .unwrap();

        // Two racers per partial, shuffled.
        let mut jobs: Vec<(String, usize)> = order
            .partial_orders
            .iter()
            .flat_map(|p| [(p.id.clone(), 0), (p.id.clone(), 1)])
            .collect();
        jobs.shuffle(&mut rand::thread_rng());

        let wins = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|(partial_id, racer)| {
                let c = c.clone();
                let wins = wins.clone();
                tokio::task::spawn_blocking(move || {
                    let resolver = format!("{partial_id}-racer-{racer}");
                    match c.execute_partial_fill(&partial_id, &resolver, ExecutionOptions::default())
                    {
                        Ok(_) => {
                            wins.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(FillError::AlreadyExecuted(_)) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 10);
        let progress = c.get_progress(&order.id).unwrap();
        assert_eq!(progress.completed_parts, 10);
        assert_eq!(progress.completion_percentage, 100.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_generation_yields_distinct_secrets() {
        init_tracing();
        let manager = Arc::new(SecretManager::new(
            Arc::new(InMemorySecretStore::new()),
            Arc::new(ManualTimeSource::new(0)),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::task::spawn_blocking(move || {
                    let batch = manager.generate_many(50).unwrap();
                    let hashes = manager.hash_all(&batch);
                    manager.store(&batch, &hashes, None).map(|_| batch)
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap().unwrap());
        }

        let stats = manager.stats(&all);
        assert_eq!(stats.count, 400);
        assert_eq!(stats.unique_count, 400);
        assert!(all.iter().all(|s| manager.is_active(s)));
    }
}
