use dashmap::DashMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Starting price for a symbol that has never been priced.
pub const DEFAULT_REFERENCE_PRICE: Decimal = dec!(10.00);

/// Synthetic reference price per symbol, maintained by the price engine.
///
/// Also the default price source for newly submitted market orders that
/// arrive without a quoted price.
#[derive(Debug, Default)]
pub struct ReferencePrices {
    prices: DashMap<String, Decimal>,
}

#[allow(unused)]
impl ReferencePrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).map(|p| *p)
    }

    /// Current reference price, installing the default on first touch so
    /// the next tick has a base to walk from.
    pub fn get_or_default(&self, symbol: &str) -> Decimal {
        *self
            .prices
            .entry(symbol.to_string())
            .or_insert(DEFAULT_REFERENCE_PRICE)
    }

    pub fn set(&self, symbol: &str, price: Decimal) {
        self.prices.insert(symbol.to_string(), price);
    }

    pub fn symbols(&self) -> Vec<String> {
        self.prices.iter().map(|e| e.key().clone()).collect()
    }
}
