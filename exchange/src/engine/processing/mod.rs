//! Processing Module
//!
//! The cycle-based matching pipeline:
//! - `context`: per-cycle snapshot and per-processor result accumulator
//! - `processor`: the order-processor contract
//! - `market`: market-order matching (the concrete hot path)
//! - `gtt`: GTT trigger monitoring and re-routing
//! - `orchestrator`: cycle state machine and single-cycle guard
//! - `post`: commit and notification sink contracts

pub mod context;
pub mod gtt;
pub mod market;
pub mod orchestrator;
pub mod post;
pub mod processor;

pub use context::{ProcessingContext, ProcessingResult};
pub use gtt::GttOrderProcessor;
pub use market::MarketOrderProcessor;
pub use orchestrator::{CycleOutcome, ProcessingOrchestrator};
pub use post::{CommitSink, NotificationSink};
pub use processor::OrderProcessor;
