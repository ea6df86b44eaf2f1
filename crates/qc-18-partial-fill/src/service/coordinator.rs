//! # Partial-Fill Coordinator
//!
//! Owns order and partial-order state: decomposition, resolver binding,
//! bidding, race-safe execution and completion tracking.
//!
//! Every mutation goes through `OrderStore::update`, which applies it to a
//! copy under the store lock and commits only on success. Bid ledgers are
//! part of the order, so this covers bidding too:
//! - a rejected call leaves the order untouched
//! - of concurrent executions of one partial order exactly one commits;
//!   the rest observe the execution record and fail `AlreadyExecuted`
//! - accepting a bid and recording `accepted_resolver` commit together

use std::sync::Arc;

use qc_15_htlc::algorithms::{hash160, verify_secret};
use qc_15_htlc::{SecretHash, SecureSecret, TimeSource, Timestamp};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    invariant_amounts_balance, parse_partial_order_id, partial_order_id, BidStatus,
    BidSubmission, CoordinatorConfig, CreateOrderRequest, ExecutionOptions, ExecutionPolicy,
    ExecutionRecord, FillError, OrderAnalytics, OrderProgress, OrderStatus, PartialFillOrder,
    PartialOrder, PartialOrderStatus, ResolverAssignment, ResolverBid,
};
use crate::metrics::CoordinatorMetrics;
use crate::ports::{OrderStore, PartialFillApi, ResolverSelector};

/// Coordinates partial fills over an injected store and resolver selector.
pub struct PartialFillCoordinator {
    config: CoordinatorConfig,
    store: Arc<dyn OrderStore>,
    selector: Arc<dyn ResolverSelector>,
    clock: Arc<dyn TimeSource>,
    metrics: Arc<CoordinatorMetrics>,
}

fn terminal(order: &PartialFillOrder) -> FillError {
    FillError::OrderTerminal {
        order_id: order.id.clone(),
        status: order.status.to_string(),
    }
}

fn transition(id: &str, from: impl ToString, to: impl ToString) -> FillError {
    FillError::InvalidTransition {
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn partial_mut<'a>(
    order: &'a mut PartialFillOrder,
    partial_order_id: &str,
) -> Result<&'a mut PartialOrder, FillError> {
    order
        .partial_mut(partial_order_id)
        .ok_or_else(|| FillError::NotFound(partial_order_id.to_string()))
}

impl PartialFillCoordinator {
    /// Create a coordinator with default configuration.
    pub fn new(
        store: Arc<dyn OrderStore>,
        selector: Arc<dyn ResolverSelector>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config: CoordinatorConfig::default(),
            store,
            selector,
            clock,
            metrics: Arc::new(CoordinatorMetrics::new()),
        }
    }

    /// Create a coordinator with custom configuration.
    pub fn with_config(
        config: CoordinatorConfig,
        store: Arc<dyn OrderStore>,
        selector: Arc<dyn ResolverSelector>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, FillError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            selector,
            clock,
            metrics: Arc::new(CoordinatorMetrics::new()),
        })
    }

    /// Coordinator counters.
    pub fn metrics(&self) -> &CoordinatorMetrics {
        &self.metrics
    }

    fn check_amounts(&self, total_amount: f64, partial_amounts: &[f64]) -> Result<(), FillError> {
        if partial_amounts.len() > self.config.max_partials_per_order {
            return Err(FillError::InvalidParameter(format!(
                "{} partial orders exceeds limit {}",
                partial_amounts.len(),
                self.config.max_partials_per_order
            )));
        }
        invariant_amounts_balance(total_amount, partial_amounts, self.config.amount_tolerance)
    }

    /// Resolve per-partial secret hashes from the request.
    fn request_hashes(
        request: &CreateOrderRequest,
        parts: usize,
    ) -> Result<Option<Vec<SecretHash>>, FillError> {
        let check_len = |what: &str, len: usize| {
            if len == parts {
                Ok(())
            } else {
                Err(FillError::InvalidParameter(format!(
                    "{len} {what} for {parts} partial orders"
                )))
            }
        };

        match (&request.secret_hashes, &request.secrets) {
            (None, None) => Ok(None),
            (Some(hashes), None) => {
                check_len("secret hashes", hashes.len())?;
                Ok(Some(hashes.clone()))
            }
            (hashes, Some(secrets)) => {
                check_len("secrets", secrets.len())?;
                let derived: Vec<SecretHash> =
                    secrets.iter().map(|s| hash160(s.as_bytes())).collect();
                if let Some(hashes) = hashes {
                    check_len("secret hashes", hashes.len())?;
                    if let Some(index) = derived.iter().zip(hashes).position(|(d, h)| d != h) {
                        return Err(FillError::SecretMismatch(partial_order_id(
                            request.order_id.as_deref().unwrap_or("new"),
                            index,
                        )));
                    }
                }
                Ok(Some(derived))
            }
        }
    }

    fn build_partials(
        order_id: &str,
        amounts: &[f64],
        hashes: Option<Vec<SecretHash>>,
        secrets: Option<Vec<SecureSecret>>,
    ) -> Vec<PartialOrder> {
        let mut hashes = hashes.map(Vec::into_iter);
        let mut secrets = secrets.map(Vec::into_iter);
        amounts
            .iter()
            .enumerate()
            .map(|(index, amount)| {
                let mut partial = PartialOrder::new(partial_order_id(order_id, index), *amount);
                partial.secret_hash = hashes.as_mut().and_then(Iterator::next);
                partial.secret = secrets.as_mut().and_then(Iterator::next);
                partial
            })
            .collect()
    }

    fn order_id_of(partial_order_id: &str) -> Result<&str, FillError> {
        parse_partial_order_id(partial_order_id)
            .map(|(order_id, _)| order_id)
            .ok_or_else(|| FillError::NotFound(partial_order_id.to_string()))
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

impl PartialFillApi for PartialFillCoordinator {
    fn create_order(&self, request: CreateOrderRequest) -> Result<PartialFillOrder, FillError> {
        self.check_amounts(request.total_amount, &request.partial_amounts)?;
        let hashes = Self::request_hashes(&request, request.partial_amounts.len())?;

        let order_id = match &request.order_id {
            Some(id) if id.trim().is_empty() => {
                return Err(FillError::InvalidParameter("order id is empty".into()))
            }
            Some(id) => id.clone(),
            None => Uuid::new_v4().to_string(),
        };

        let now = self.now();
        let CreateOrderRequest {
            total_amount,
            partial_amounts,
            secrets,
            ..
        } = request;
        let order = PartialFillOrder {
            partial_orders: Self::build_partials(&order_id, &partial_amounts, hashes, secrets),
            id: order_id,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            assignment_history: Vec::new(),
            reassignments: 0,
        };

        self.store.insert(order.clone())?;
        CoordinatorMetrics::incr(&self.metrics.orders_created);
        info!(
            "[qc-18] created order {} ({} partial orders, total={})",
            order.id,
            order.partial_orders.len(),
            order.total_amount
        );
        Ok(order)
    }

    fn get_order(&self, order_id: &str) -> Result<PartialFillOrder, FillError> {
        self.store
            .get(order_id)
            .ok_or_else(|| FillError::NotFound(order_id.to_string()))
    }

    fn modify_order(
        &self,
        order_id: &str,
        partial_amounts: Vec<f64>,
    ) -> Result<PartialFillOrder, FillError> {
        let now = self.now();
        let order = self.store.update(order_id, &mut |order| {
            if order.status.is_terminal() {
                return Err(terminal(order));
            }
            if order.status != OrderStatus::Pending {
                return Err(transition(&order.id, order.status, "modified"));
            }
            self.check_amounts(order.total_amount, &partial_amounts)?;

            order.partial_orders = Self::build_partials(&order.id, &partial_amounts, None, None);
            order.updated_at = now;
            Ok(())
        })?;

        info!(
            "[qc-18] modified order {} into {} partial orders",
            order.id,
            order.partial_orders.len()
        );
        Ok(order)
    }

    fn cancel_order(&self, order_id: &str) -> Result<PartialFillOrder, FillError> {
        let now = self.now();
        let order = self.store.update(order_id, &mut |order| {
            if !order.status.can_transition_to(OrderStatus::Cancelled) {
                return Err(terminal(order));
            }
            order.status = OrderStatus::Cancelled;
            order.updated_at = now;
            Ok(())
        })?;

        CoordinatorMetrics::incr(&self.metrics.orders_cancelled);
        info!("[qc-18] cancelled order {}", order.id);
        Ok(order)
    }

    fn assign_resolvers(&self, order_id: &str) -> Result<Vec<ResolverAssignment>, FillError> {
        let now = self.now();
        let mut assigned = Vec::new();

        self.store.update(order_id, &mut |order| {
            if order.status.is_terminal() {
                return Err(terminal(order));
            }
            assigned.clear();
            for partial in order
                .partial_orders
                .iter_mut()
                .filter(|p| p.status == PartialOrderStatus::Pending)
            {
                let resolver_id = self.selector.select(partial)?;
                assigned.push(partial.assign(resolver_id, now));
            }
            order.assignment_history.extend(assigned.iter().cloned());
            order.updated_at = now;
            Ok(())
        })?;

        debug!(
            "[qc-18] order {}: {} new resolver assignments",
            order_id,
            assigned.len()
        );
        Ok(assigned)
    }

    fn submit_bid(
        &self,
        partial_order_id: &str,
        bid: BidSubmission,
    ) -> Result<ResolverBid, FillError> {
        if bid.resolver_id.trim().is_empty() {
            return Err(FillError::InvalidParameter("resolver id is empty".into()));
        }
        if !bid.bid_amount.is_finite() || bid.bid_amount <= 0.0 {
            return Err(FillError::InvalidAmount(format!(
                "bid amount {} must be finite and positive",
                bid.bid_amount
            )));
        }
        if !bid.fee.is_finite() || bid.fee < 0.0 {
            return Err(FillError::InvalidAmount(format!(
                "bid fee {} must be finite and non-negative",
                bid.fee
            )));
        }

        let now = self.now();
        let mut recorded = None;
        self.store
            .update(Self::order_id_of(partial_order_id)?, &mut |order| {
                if order.status.is_terminal() {
                    return Err(terminal(order));
                }
                let partial = partial_mut(order, partial_order_id)?;
                let entry = ResolverBid {
                    partial_order_id: partial.id.clone(),
                    resolver_id: bid.resolver_id.clone(),
                    bid_amount: bid.bid_amount,
                    fee: bid.fee,
                    status: BidStatus::Submitted,
                    submitted_at: now,
                };
                partial.bids.push(entry.clone());
                order.updated_at = now;
                recorded = Some(entry);
                Ok(())
            })?;

        let recorded =
            recorded.ok_or_else(|| FillError::NotFound(partial_order_id.to_string()))?;
        debug!(
            "[qc-18] bid on {} from {} (fee={})",
            partial_order_id, recorded.resolver_id, recorded.fee
        );
        Ok(recorded)
    }

    fn accept_bid(
        &self,
        partial_order_id: &str,
        resolver_id: &str,
    ) -> Result<ResolverBid, FillError> {
        let now = self.now();
        let mut accepted = None;
        self.store
            .update(Self::order_id_of(partial_order_id)?, &mut |order| {
                if order.status.is_terminal() {
                    return Err(terminal(order));
                }
                let partial = partial_mut(order, partial_order_id)?;
                if partial.execution.is_some() {
                    return Err(FillError::AlreadyExecuted(partial.id.clone()));
                }
                let latest = partial
                    .bids
                    .iter()
                    .rposition(|b| b.resolver_id == resolver_id && b.status == BidStatus::Submitted)
                    .ok_or_else(|| {
                        FillError::NotFound(format!(
                            "open bid from {resolver_id} on {partial_order_id}"
                        ))
                    })?;
                for (index, bid) in partial.bids.iter_mut().enumerate() {
                    if index == latest {
                        bid.status = BidStatus::Accepted;
                        accepted = Some(bid.clone());
                    } else if bid.status == BidStatus::Submitted {
                        bid.status = BidStatus::Rejected;
                    }
                }
                partial.accepted_resolver = Some(resolver_id.to_string());
                order.updated_at = now;
                Ok(())
            })?;

        info!("[qc-18] accepted bid from {} on {}", resolver_id, partial_order_id);
        accepted.ok_or_else(|| FillError::NotFound(partial_order_id.to_string()))
    }

    fn begin_execution(
        &self,
        partial_order_id: &str,
        resolver_id: &str,
    ) -> Result<PartialOrder, FillError> {
        let now = self.now();
        let policy = self.config.execution_policy;

        let order = self
            .store
            .update(Self::order_id_of(partial_order_id)?, &mut |order| {
                if order.status.is_terminal() {
                    return Err(terminal(order));
                }
                let partial = partial_mut(order, partial_order_id)?;
                if partial.execution.is_some() {
                    return Err(FillError::AlreadyExecuted(partial.id.clone()));
                }
                if !partial
                    .status
                    .can_transition_to(PartialOrderStatus::Executing)
                {
                    return Err(transition(
                        &partial.id,
                        partial.status,
                        PartialOrderStatus::Executing,
                    ));
                }
                if policy == ExecutionPolicy::AcceptedBidderOnly
                    && partial.accepted_resolver.as_deref() != Some(resolver_id)
                {
                    return Err(FillError::ResolverNotAuthorized {
                        partial_order_id: partial.id.clone(),
                        resolver_id: resolver_id.to_string(),
                    });
                }

                partial.status = PartialOrderStatus::Executing;
                partial.resolver_id = Some(resolver_id.to_string());
                if order.status == OrderStatus::Pending {
                    order.status = OrderStatus::Executing;
                }
                order.updated_at = now;
                Ok(())
            })?;

        debug!("[qc-18] {} claimed {}", resolver_id, partial_order_id);
        order
            .partial(partial_order_id)
            .cloned()
            .ok_or_else(|| FillError::NotFound(partial_order_id.to_string()))
    }

    fn execute_partial_fill(
        &self,
        partial_order_id: &str,
        resolver_id: &str,
        options: ExecutionOptions,
    ) -> Result<ExecutionRecord, FillError> {
        let now = self.now();
        let policy = self.config.execution_policy;
        let mut record = None;

        let result = self
            .store
            .update(Self::order_id_of(partial_order_id)?, &mut |order| {
                let order_status = order.status;
                let terminal_err = terminal(order);
                let partial = partial_mut(order, partial_order_id)?;

                if partial.execution.is_some() {
                    return Err(FillError::AlreadyExecuted(partial.id.clone()));
                }
                if order_status.is_terminal() {
                    return Err(terminal_err);
                }
                if !partial
                    .status
                    .can_transition_to(PartialOrderStatus::Completed)
                {
                    return Err(transition(
                        &partial.id,
                        partial.status,
                        PartialOrderStatus::Completed,
                    ));
                }
                let unauthorized = || FillError::ResolverNotAuthorized {
                    partial_order_id: partial_order_id.to_string(),
                    resolver_id: resolver_id.to_string(),
                };
                if partial.status == PartialOrderStatus::Executing
                    && partial.resolver_id.as_deref() != Some(resolver_id)
                {
                    return Err(unauthorized());
                }
                if policy == ExecutionPolicy::AcceptedBidderOnly
                    && partial.accepted_resolver.as_deref() != Some(resolver_id)
                {
                    return Err(unauthorized());
                }
                if let Some(hash) = &partial.secret_hash {
                    let opens = options
                        .secret
                        .as_ref()
                        .is_some_and(|secret| verify_secret(secret, hash));
                    if !opens {
                        return Err(FillError::SecretMismatch(partial.id.clone()));
                    }
                }

                let execution = ExecutionRecord {
                    resolver_id: resolver_id.to_string(),
                    executed_at: now,
                    tx_reference: options.tx_reference.clone(),
                };
                partial.execution = Some(execution.clone());
                partial.status = PartialOrderStatus::Completed;
                partial.resolver_id = Some(resolver_id.to_string());
                if order.status == OrderStatus::Pending {
                    order.status = OrderStatus::Executing;
                }
                order.updated_at = now;
                record = Some(execution);
                Ok(())
            });

        match result {
            Ok(_) => {}
            Err(err @ FillError::AlreadyExecuted(_)) => {
                CoordinatorMetrics::incr(&self.metrics.execution_races_lost);
                debug!(
                    "[qc-18] {} lost execution of {}: already executed",
                    resolver_id, partial_order_id
                );
                return Err(err);
            }
            Err(err) => return Err(err),
        }

        CoordinatorMetrics::incr(&self.metrics.partial_fills_executed);
        info!("[qc-18] {} executed {}", resolver_id, partial_order_id);
        record.ok_or_else(|| FillError::NotFound(partial_order_id.to_string()))
    }

    fn mark_resolver_failed(
        &self,
        partial_order_id: &str,
        resolver_id: &str,
    ) -> Result<PartialOrder, FillError> {
        let now = self.now();
        let order = self
            .store
            .update(Self::order_id_of(partial_order_id)?, &mut |order| {
                if order.status.is_terminal() {
                    return Err(terminal(order));
                }
                let partial = partial_mut(order, partial_order_id)?;
                if !partial.status.can_transition_to(PartialOrderStatus::Failed) {
                    return Err(transition(
                        &partial.id,
                        partial.status,
                        PartialOrderStatus::Failed,
                    ));
                }
                if partial.resolver_id.as_deref() != Some(resolver_id) {
                    return Err(FillError::ResolverNotAuthorized {
                        partial_order_id: partial.id.clone(),
                        resolver_id: resolver_id.to_string(),
                    });
                }

                partial.status = PartialOrderStatus::Failed;
                partial.failed_resolvers.push(resolver_id.to_string());
                partial.resolver_id = None;
                partial.assignment = None;
                if partial.accepted_resolver.as_deref() == Some(resolver_id) {
                    partial.accepted_resolver = None;
                }
                order.updated_at = now;
                Ok(())
            })?;

        CoordinatorMetrics::incr(&self.metrics.resolver_failures);
        warn!("[qc-18] resolver {} failed {}", resolver_id, partial_order_id);
        order
            .partial(partial_order_id)
            .cloned()
            .ok_or_else(|| FillError::NotFound(partial_order_id.to_string()))
    }

    fn reassign_failed_resolver(
        &self,
        partial_order_id: &str,
    ) -> Result<ResolverAssignment, FillError> {
        let now = self.now();
        let mut assignment = None;

        self.store
            .update(Self::order_id_of(partial_order_id)?, &mut |order| {
                if order.status.is_terminal() {
                    return Err(terminal(order));
                }
                let partial = partial_mut(order, partial_order_id)?;
                if partial.status != PartialOrderStatus::Failed {
                    return Err(transition(
                        &partial.id,
                        partial.status,
                        PartialOrderStatus::Assigned,
                    ));
                }
                let resolver_id = self.selector.select(partial)?;
                let made = partial.assign(resolver_id, now);
                order.assignment_history.push(made.clone());
                order.reassignments += 1;
                order.updated_at = now;
                assignment = Some(made);
                Ok(())
            })?;

        CoordinatorMetrics::incr(&self.metrics.reassignments);
        let assignment =
            assignment.ok_or_else(|| FillError::NotFound(partial_order_id.to_string()))?;
        info!(
            "[qc-18] reassigned {} to {}",
            partial_order_id, assignment.resolver_id
        );
        Ok(assignment)
    }

    fn get_progress(&self, order_id: &str) -> Result<OrderProgress, FillError> {
        Ok(self.get_order(order_id)?.progress())
    }

    fn get_analytics(&self, order_id: &str) -> Result<OrderAnalytics, FillError> {
        let order = self.get_order(order_id)?;
        let count = |status: PartialOrderStatus| {
            order
                .partial_orders
                .iter()
                .filter(|p| p.status == status)
                .count()
        };

        let filled_amount: f64 = order
            .partial_orders
            .iter()
            .filter(|p| p.status == PartialOrderStatus::Completed)
            .map(|p| p.amount)
            .sum();

        let bids: Vec<&ResolverBid> = order
            .partial_orders
            .iter()
            .flat_map(|p| &p.bids)
            .collect();
        let average_bid_fee = if bids.is_empty() {
            0.0
        } else {
            bids.iter().map(|b| b.fee).sum::<f64>() / bids.len() as f64
        };

        Ok(OrderAnalytics {
            total_parts: order.partial_orders.len(),
            pending_parts: count(PartialOrderStatus::Pending),
            assigned_parts: count(PartialOrderStatus::Assigned),
            executing_parts: count(PartialOrderStatus::Executing),
            completed_parts: count(PartialOrderStatus::Completed),
            failed_parts: count(PartialOrderStatus::Failed),
            total_amount: order.total_amount,
            filled_amount,
            fill_ratio: filled_amount / order.total_amount,
            unique_resolvers: order.resolvers_seen().len(),
            total_bids: bids.len(),
            average_bid_fee,
            reassignments: order.reassignments,
        })
    }

    fn mark_complete(&self, order_id: &str) -> Result<PartialFillOrder, FillError> {
        let now = self.now();
        let order = self.store.update(order_id, &mut |order| {
            if order.status.is_terminal() {
                return Err(terminal(order));
            }
            if !order.status.can_transition_to(OrderStatus::Completed) {
                return Err(transition(&order.id, order.status, OrderStatus::Completed));
            }
            order.status = OrderStatus::Completed;
            order.updated_at = now;
            Ok(())
        })?;

        let progress = order.progress();
        if progress.completed_parts < progress.total_parts {
            warn!(
                "[qc-18] order {} marked complete at {:.1}% ({}/{} partial orders)",
                order.id,
                progress.completion_percentage,
                progress.completed_parts,
                progress.total_parts
            );
        } else {
            info!("[qc-18] order {} complete", order.id);
        }
        Ok(order)
    }
}
