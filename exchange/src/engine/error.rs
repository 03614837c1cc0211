use crate::engine::entry::OrderType;
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy of the order-book engine.
///
/// Routing and book errors fail the call that produced them; processor and
/// commit errors are contained by the orchestrator and never abort a cycle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An order was routed to a book variant that does not accept its type.
    #[error("order {id} of type {actual:?} cannot enter a {expected:?} book")]
    InvalidOrderKind {
        expected: OrderType,
        actual: OrderType,
        id: Uuid,
    },

    /// A market/limit/GTT order reached a book without its required price.
    #[error("order {id} is missing a price and cannot be stored")]
    MissingPrice { id: Uuid },

    /// An order type with no registered manager. The order is dropped.
    #[error("unsupported order type {0:?}")]
    UnsupportedOrderKind(OrderType),

    /// An order processor failed mid-cycle. Its result is discarded; the
    /// remaining processors still run.
    #[error("processor {processor} failed: {reason}")]
    ProcessorFailure {
        processor: &'static str,
        reason: String,
    },

    /// The persistence hand-off failed after matching. In-memory book state
    /// is already mutated and is not rolled back.
    #[error("commit of cycle results failed")]
    Commit(#[source] anyhow::Error),
}
