//! Pricing Module
//!
//! Price state shared between matching and the synthetic market:
//! - `ltp`: last-traded-price store, written by the matching processors
//! - `reference`: synthetic reference prices, written by the price engine
//! - `history`: fire-and-forget time-series sink contract
//! - `price_engine`: the scheduled demand/supply random-walk price loop

pub mod history;
pub mod ltp;
pub mod price_engine;
pub mod reference;

pub use history::{PriceHistorySink, PriceSample};
pub use ltp::LtpStore;
pub use price_engine::{PriceEngine, PriceModel};
pub use reference::{ReferencePrices, DEFAULT_REFERENCE_PRICE};
