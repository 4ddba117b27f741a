//! Rebalance application boundary — time-boxed dispatch.
//!
//! Applying orders is attempted synchronously against a wall-clock budget.
//! A request that has already burned through the budget is never executed
//! locally: it is handed off whole to the asynchronous execution
//! collaborator and reported as enqueued. Exactly one of {synchronous
//! apply, async enqueue} happens per request — this is admission control,
//! not a retry path.
//!
//! Collaborators (order execution, event publication, queue transport,
//! clock) are injected capabilities decided at construction; each has a
//! default implementation so a dispatcher without downstream services is a
//! construction choice, not a runtime import guard.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use portlab_core::Order;

/// Default wall-clock budget for a synchronous apply.
pub const DEFAULT_BUDGET: Duration = Duration::from_millis(9000);

/// Event topic announcing synchronously applied orders.
pub const ORDERS_APPLIED_TOPIC: &str = "orders.applied";

/// A rebalance application request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub orders: Vec<Order>,
}

/// Outcome of an apply call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// Orders were executed synchronously.
    Applied { orders: Vec<Order> },
    /// The request was routed whole to the async collaborator.
    Enqueued,
}

/// Errors from the dispatch boundary.
///
/// Publish failures are deliberately absent: a failed notification never
/// rolls back already-applied orders.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("order execution failed: {0}")]
    Execution(String),

    #[error("async enqueue failed: {0}")]
    Enqueue(String),
}

// ─── Injected capabilities ───────────────────────────────────────────

/// Applies orders against a broker or exchange.
pub trait OrderExecutor: Send + Sync {
    fn execute(&self, orders: &[Order]) -> Result<(), String>;
}

/// Publishes fire-and-forget events for downstream consumers.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), String>;
}

/// Forwards a whole request to asynchronous execution.
pub trait QueueDispatcher: Send + Sync {
    fn enqueue(&self, request: &ApplyRequest) -> Result<(), String>;
}

/// Elapsed wall-clock time for the current request.
pub trait Clock: Send + Sync {
    fn elapsed(&self) -> Duration;
}

/// Executor that accepts every order without side effects.
#[derive(Debug, Default)]
pub struct NoopExecutor;

impl OrderExecutor for NoopExecutor {
    fn execute(&self, _orders: &[Order]) -> Result<(), String> {
        Ok(())
    }
}

/// Publisher that drops every event.
#[derive(Debug, Default)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _topic: &str, _payload: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Queue that accepts and discards every request.
#[derive(Debug, Default)]
pub struct NoopQueue;

impl QueueDispatcher for NoopQueue {
    fn enqueue(&self, _request: &ApplyRequest) -> Result<(), String> {
        Ok(())
    }
}

/// Wall clock measured from construction.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

// ─── Dispatcher ──────────────────────────────────────────────────────

/// The apply boundary with its injected collaborators.
pub struct RebalanceDispatcher {
    budget: Duration,
    executor: Box<dyn OrderExecutor>,
    publisher: Box<dyn EventPublisher>,
    queue: Box<dyn QueueDispatcher>,
}

impl RebalanceDispatcher {
    pub fn new(
        budget: Duration,
        executor: Box<dyn OrderExecutor>,
        publisher: Box<dyn EventPublisher>,
        queue: Box<dyn QueueDispatcher>,
    ) -> Self {
        Self {
            budget,
            executor,
            publisher,
            queue,
        }
    }

    /// Dispatcher with the default budget and no downstream collaborators.
    pub fn detached() -> Self {
        Self::new(
            DEFAULT_BUDGET,
            Box::new(NoopExecutor),
            Box::new(NoopPublisher),
            Box::new(NoopQueue),
        )
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Apply a request, measuring elapsed time on a fresh system clock.
    pub fn apply(&self, request: &ApplyRequest) -> Result<ApplyOutcome, DispatchError> {
        self.apply_with_clock(request, &SystemClock::start())
    }

    /// Apply a request against an explicit clock.
    ///
    /// If the clock has already exceeded the budget, nothing is executed:
    /// the whole request is enqueued once and the call reports `Enqueued`.
    /// Otherwise the orders are executed synchronously and an
    /// `orders.applied` event is published; a publish failure is logged
    /// and swallowed.
    pub fn apply_with_clock(
        &self,
        request: &ApplyRequest,
        clock: &dyn Clock,
    ) -> Result<ApplyOutcome, DispatchError> {
        if clock.elapsed() > self.budget {
            self.queue
                .enqueue(request)
                .map_err(DispatchError::Enqueue)?;
            tracing::info!(
                orders = request.orders.len(),
                budget_ms = self.budget.as_millis() as u64,
                "rebalance apply over budget, enqueued for async execution"
            );
            return Ok(ApplyOutcome::Enqueued);
        }

        self.executor
            .execute(&request.orders)
            .map_err(DispatchError::Execution)?;

        let payload =
            serde_json::to_string(&request.orders).unwrap_or_else(|_| "[]".to_string());
        if let Err(err) = self.publisher.publish(ORDERS_APPLIED_TOPIC, &payload) {
            tracing::warn!(error = %err, "orders.applied publish failed, orders remain applied");
        }

        Ok(ApplyOutcome::Applied {
            orders: request.orders.clone(),
        })
    }
}
