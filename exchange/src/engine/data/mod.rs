//! Data Structures Module
//!
//! Order-book storage for the engine:
//! - `linked_book`: arena-indexed doubly linked book for limit and GTT orders
//! - `market_book`: triple-indexed book for market orders

pub mod linked_book;
pub mod market_book;

pub use linked_book::LinkedOrderBook;
pub use market_book::MarketOrderBook;

use crate::engine::entry::Order;
use crate::engine::error::EngineError;
use uuid::Uuid;

/// Common surface of the per-symbol, per-side books, used by the generic
/// book manager.
pub trait Book: Send {
    fn add(&mut self, order: Order) -> Result<(), EngineError>;
    fn remove(&mut self, order_id: &Uuid) -> Option<Order>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Book for LinkedOrderBook {
    fn add(&mut self, order: Order) -> Result<(), EngineError> {
        LinkedOrderBook::add(self, order)
    }

    fn remove(&mut self, order_id: &Uuid) -> Option<Order> {
        LinkedOrderBook::remove(self, order_id)
    }

    fn len(&self) -> usize {
        LinkedOrderBook::len(self)
    }
}

impl Book for MarketOrderBook {
    fn add(&mut self, order: Order) -> Result<(), EngineError> {
        MarketOrderBook::add(self, order)
    }

    fn remove(&mut self, order_id: &Uuid) -> Option<Order> {
        MarketOrderBook::remove(self, order_id)
    }

    fn len(&self) -> usize {
        MarketOrderBook::len(self)
    }
}
