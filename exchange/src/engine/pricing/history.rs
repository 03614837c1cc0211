use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One immutable price observation for the time-series history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    pub symbol: String,
    pub price: Decimal,
    /// Traded quantity for execution samples; total open liquidity for
    /// synthetic price-engine samples.
    pub quantity: u64,
    /// Milliseconds since the Unix epoch.
    pub at: u64,
}

/// External time-series sink for price samples. Fire-and-forget: the engine
/// never waits on it and ignores delivery outcomes.
pub trait PriceHistorySink: Send + Sync {
    fn record(&self, sample: PriceSample);
}
