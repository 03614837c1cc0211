use crate::engine::error::EngineError;
use crate::engine::processing::{ProcessingContext, ProcessingResult};

/// Contract for a specialist order processor.
///
/// Each implementation owns a disjoint order-type slice of the books. A
/// processor must leave the books self-consistent even when it returns an
/// error: the orchestrator discards its result but performs no rollback.
pub trait OrderProcessor: Send + Sync {
    /// Stable name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Runs one pass over the processor's books for the given cycle,
    /// collecting every trade and order-status change it caused.
    fn process(&self, context: &ProcessingContext) -> Result<ProcessingResult, EngineError>;
}
