//! Metrics collection module for the exchange engine
//!
//! Prometheus collectors for order flow, matching output and cycle cost,
//! exposed over the metrics endpoint started by the server.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry instance
    pub static ref REGISTRY_INSTANCE: Registry = Registry::new();

    /// Counter for orders accepted into the router, by order type
    pub static ref ORDER_COUNTER_VEC: CounterVec = CounterVec::new(
        Opts::new("orders_received", "orders received by type"),
        &["type"]
    )
    .unwrap();

    /// Counter for executed trades
    pub static ref TRADE_COUNTER: Counter =
        Counter::new("trades_executed", "trades executed").unwrap();

    /// Counter for order-processor failures, by processor
    pub static ref PROCESSOR_FAILURE_VEC: CounterVec = CounterVec::new(
        Opts::new("processor_failures", "order processor failures"),
        &["processor"]
    )
    .unwrap();

    /// Histogram of processing-cycle durations
    pub static ref CYCLE_HISTOGRAM: Histogram =
        Histogram::with_opts(HistogramOpts::new("cycle_cost", "processing cycle cost")).unwrap();
}

/// Initializes the metrics registry
///
/// Registers all metric collectors with the global registry
pub fn init_registry() {
    let _ = REGISTRY_INSTANCE.register(Box::new(ORDER_COUNTER_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(TRADE_COUNTER.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(PROCESSOR_FAILURE_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(CYCLE_HISTOGRAM.clone()));
}
