use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// In-memory, thread-safe store of last traded prices.
///
/// Updated by the matching processors on every execution; read by the
/// processing orchestrator (cycle snapshot) and the GTT trigger checks.
/// Independent of the synthetic reference price computed by the price
/// engine.
#[derive(Debug, Default)]
pub struct LtpStore {
    ltps: DashMap<String, Decimal>,
}

#[allow(unused)]
impl LtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the last traded price for a symbol. Blank symbols are ignored.
    pub fn update(&self, symbol: &str, price: Decimal) {
        if symbol.trim().is_empty() {
            return;
        }
        self.ltps.insert(symbol.to_string(), price);
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.ltps.get(symbol).map(|p| *p)
    }

    /// A point-in-time copy of every symbol's LTP, taken once per cycle so
    /// all processors in the cycle observe the same prices.
    pub fn snapshot(&self) -> HashMap<String, Decimal> {
        self.ltps
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn update_and_get() {
        let store = LtpStore::new();
        assert!(store.get("AAPL").is_none());
        store.update("AAPL", dec!(101.25));
        assert_eq!(store.get("AAPL"), Some(dec!(101.25)));
        store.update("AAPL", dec!(100.75));
        assert_eq!(store.get("AAPL"), Some(dec!(100.75)));
    }

    #[test]
    fn blank_symbols_are_ignored() {
        let store = LtpStore::new();
        store.update("  ", dec!(1));
        store.update("", dec!(1));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_updates() {
        let store = LtpStore::new();
        store.update("AAPL", dec!(100));
        let snapshot = store.snapshot();
        store.update("AAPL", dec!(200));
        assert_eq!(snapshot.get("AAPL"), Some(&dec!(100)));
    }
}
