//! Post-Processing Contracts
//!
//! External collaborators invoked at the end of a cycle. The engine hands
//! off and moves on; durability and delivery are the collaborator's job.

use crate::engine::entry::Order;
use crate::engine::processing::ProcessingResult;

/// Durable persistence for a cycle's aggregate. The collaborator must apply
/// all trades and order updates atomically and be idempotent under
/// re-delivery of the same aggregate, keyed by trade/order id — the engine
/// performs no compensating transaction when a commit fails.
pub trait CommitSink: Send + Sync {
    fn commit(&self, results: &[ProcessingResult]) -> anyhow::Result<()>;
}

/// Fan-out for order-status changes, invoked once per changed order with
/// its final snapshot, independent of the persistence step.
pub trait NotificationSink: Send + Sync {
    fn order_updated(&self, order: &Order);
}
