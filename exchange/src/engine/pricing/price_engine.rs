//! Synthetic Price Engine
//!
//! Recomputes each symbol's reference price on a fixed cadence from the
//! demand/supply imbalance of the open order population plus a stochastic
//! walk. Coupled to the matching side only through the shared reference
//! prices and the shared books, never through direct object references.

use crate::engine::entry::now_millis;
use crate::engine::pricing::{PriceHistorySink, PriceSample, ReferencePrices};
use crate::engine::routing::BookRouter;
use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

/// Parameters of the price model. Defaults match the simulation's tuning.
#[derive(Debug, Clone, Copy)]
pub struct PriceModel {
    /// Small positive drift for general market growth.
    pub drift: f64,
    /// Base volatility applied to the gaussian noise term.
    pub volatility: f64,
    /// Strength of the demand/supply imbalance adjustment.
    pub impact_factor: f64,
}

impl Default for PriceModel {
    fn default() -> Self {
        Self {
            drift: 0.0001,
            volatility: 0.005,
            impact_factor: 0.01,
        }
    }
}

pub struct PriceEngine {
    model: PriceModel,
    reference: Arc<ReferencePrices>,
    router: Arc<BookRouter>,
    history: Arc<dyn PriceHistorySink>,
}

impl PriceEngine {
    pub fn new(
        model: PriceModel,
        reference: Arc<ReferencePrices>,
        router: Arc<BookRouter>,
        history: Arc<dyn PriceHistorySink>,
    ) -> Self {
        Self {
            model,
            reference,
            router,
            history,
        }
    }

    /// One scheduled tick: update every symbol known to the reference store
    /// or currently holding open orders.
    pub fn tick(&self) {
        let mut symbols = self.reference.symbols();
        symbols.extend(self.router.active_symbols());
        symbols.sort();
        symbols.dedup();
        for symbol in symbols {
            self.update_symbol_price(&symbol);
        }
    }

    /// Recomputes and stores one symbol's reference price, appending an
    /// immutable history sample. Returns the new price.
    pub fn update_symbol_price(&self, symbol: &str) -> Decimal {
        let current = self.reference.get_or_default(symbol);
        let current_f = current.to_f64().unwrap_or(0.01);

        let (demand, supply) = self.router.open_interest(symbol);
        let liquidity = demand + supply;
        let imbalance = if liquidity > 0 {
            (demand as f64 - supply as f64) / liquidity as f64
        } else {
            0.0
        };

        let noise = gaussian(&mut rand::thread_rng());
        let random_walk = current_f * (self.model.drift + self.model.volatility * noise);
        let imbalance_adjustment = imbalance * self.model.impact_factor * current_f;

        // Floor keeps prices strictly positive; two decimals, half-up.
        let new_price_f = (current_f + random_walk + imbalance_adjustment).max(0.01);
        let new_price = Decimal::from_f64(new_price_f)
            .unwrap_or(current)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        self.reference.set(symbol, new_price);
        self.history.record(PriceSample {
            symbol: symbol.to_string(),
            price: new_price,
            quantity: liquidity,
            at: now_millis(),
        });
        new_price
    }
}

/// Standard gaussian draw via the Box-Muller transform.
fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
