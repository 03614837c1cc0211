//! Cycle Context and Result
//!
//! `ProcessingContext` is the immutable per-cycle snapshot handed to every
//! processor; `ProcessingResult` is the mutable accumulator one processor
//! invocation fills. All inter-cycle state lives in the books themselves —
//! neither type outlives its cycle.

use crate::engine::entry::{Order, Trade};
use crate::engine::pricing::{LtpStore, PriceHistorySink};
use crate::engine::routing::BookRouter;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a processor needs during one cycle. The LTP snapshot is
/// copied once at cycle start so matching decisions within the cycle are
/// not skewed by LTP updates emitted by earlier processors.
pub struct ProcessingContext {
    cycle_timestamp: u64,
    ltps: HashMap<String, Decimal>,
    router: Arc<BookRouter>,
    ltp_store: Arc<LtpStore>,
    history: Arc<dyn PriceHistorySink>,
}

impl ProcessingContext {
    pub fn new(
        cycle_timestamp: u64,
        ltps: HashMap<String, Decimal>,
        router: Arc<BookRouter>,
        ltp_store: Arc<LtpStore>,
        history: Arc<dyn PriceHistorySink>,
    ) -> Self {
        Self {
            cycle_timestamp,
            ltps,
            router,
            ltp_store,
            history,
        }
    }

    /// Timestamp marking the beginning of this cycle, used for order
    /// expiration checks.
    pub fn cycle_timestamp(&self) -> u64 {
        self.cycle_timestamp
    }

    /// Last traded price from the cycle-start snapshot.
    pub fn ltp(&self, symbol: &str) -> Option<Decimal> {
        self.ltps.get(symbol).copied()
    }

    pub fn router(&self) -> &Arc<BookRouter> {
        &self.router
    }

    /// Live LTP store, for pushing execution prices as matches happen.
    pub fn ltp_store(&self) -> &LtpStore {
        &self.ltp_store
    }

    pub fn history(&self) -> &dyn PriceHistorySink {
        self.history.as_ref()
    }
}

/// Trades and order-status changes produced by one processor invocation.
#[derive(Debug, Default)]
pub struct ProcessingResult {
    trades: Vec<Trade>,
    orders: Vec<Order>,
}

impl ProcessingResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn add_processed_order(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn processed_orders(&self) -> &[Order] {
        &self.orders
    }

    /// Results with neither trades nor order updates are discarded by the
    /// orchestrator's aggregate step.
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty() && self.orders.is_empty()
    }
}
