//! Book Router Module
//!
//! Single entry point for all order-book operations. The router owns one
//! manager per order-book variant and dispatches add/remove calls on the
//! order type; processors and the price engine reach concrete books
//! through the read accessors.

use crate::engine::data::{LinkedOrderBook, MarketOrderBook};
use crate::engine::entry::{Order, OrderSide, OrderType};
use crate::engine::error::EngineError;
use crate::engine::routing::BookManager;

pub struct BookRouter {
    market_books: BookManager<MarketOrderBook>,
    limit_books: BookManager<LinkedOrderBook>,
    gtt_books: BookManager<LinkedOrderBook>,
}

impl Default for BookRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl BookRouter {
    pub fn new() -> Self {
        Self {
            market_books: BookManager::new(MarketOrderBook::new),
            limit_books: BookManager::new(LinkedOrderBook::limit),
            gtt_books: BookManager::new(LinkedOrderBook::gtt),
        }
    }

    /// Routes an order to the manager for its type. IOC orders have no
    /// registered manager: they are logged and dropped, never stored.
    pub fn add_order(&self, order: Order) -> Result<(), EngineError> {
        match order.order_type {
            OrderType::Market => self.market_books.add_order(order),
            OrderType::Limit => self.limit_books.add_order(order),
            OrderType::Gtt => self.gtt_books.add_order(order),
            OrderType::Ioc => {
                log::warn!("IOC order handling is not implemented; dropping order {}", order.id);
                Err(EngineError::UnsupportedOrderKind(OrderType::Ioc))
            }
        }
    }

    /// Routes a cancellation. Returns the removed order, or `None` when it
    /// was not resting in any book.
    pub fn remove_order(&self, order: &Order) -> Option<Order> {
        match order.order_type {
            OrderType::Market => {
                self.market_books
                    .remove_order(&order.symbol, order.side, &order.id)
            }
            OrderType::Limit => {
                self.limit_books
                    .remove_order(&order.symbol, order.side, &order.id)
            }
            OrderType::Gtt => self.gtt_books.remove_order(&order.symbol, order.side, &order.id),
            OrderType::Ioc => None,
        }
    }

    pub fn market_books(&self) -> &BookManager<MarketOrderBook> {
        &self.market_books
    }

    pub fn limit_books(&self) -> &BookManager<LinkedOrderBook> {
        &self.limit_books
    }

    pub fn gtt_books(&self) -> &BookManager<LinkedOrderBook> {
        &self.gtt_books
    }

    /// Every symbol holding at least one book of any variant.
    pub fn active_symbols(&self) -> Vec<String> {
        let mut symbols = self.market_books.symbols();
        symbols.extend(self.limit_books.symbols());
        symbols.extend(self.gtt_books.symbols());
        symbols.sort();
        symbols.dedup();
        symbols
    }

    /// Aggregate open demand and supply for a symbol: the summed remaining
    /// quantity of open and partially filled orders across all book
    /// variants, buy side and sell side respectively.
    pub fn open_interest(&self, symbol: &str) -> (u64, u64) {
        let mut demand = 0u64;
        let mut supply = 0u64;

        for (side, total) in [
            (OrderSide::Buy, &mut demand),
            (OrderSide::Sell, &mut supply),
        ] {
            if let Some(book) = self.market_books.book(symbol, side) {
                let book = book.lock().unwrap();
                *total += book.iter().filter(|o| o.is_open()).map(|o| o.quantity).sum::<u64>();
            }
            if let Some(book) = self.limit_books.book(symbol, side) {
                let book = book.lock().unwrap();
                *total += book.iter().filter(|o| o.is_open()).map(|o| o.quantity).sum::<u64>();
            }
            if let Some(book) = self.gtt_books.book(symbol, side) {
                let book = book.lock().unwrap();
                *total += book.iter().filter(|o| o.is_open()).map(|o| o.quantity).sum::<u64>();
            }
        }
        (demand, supply)
    }
}
