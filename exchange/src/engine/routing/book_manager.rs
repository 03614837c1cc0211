//! Book Management Module
//!
//! One `BookManager` instance exists per order-book variant. It owns the
//! symbol-to-book registries for both sides and creates a book lazily on
//! the first order for a (side, symbol) pair. Symbols are never evicted;
//! an empty book simply stays registered.

use crate::engine::data::Book;
use crate::engine::entry::{Order, OrderSide};
use crate::engine::error::EngineError;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Symbol-to-book registry for a single book variant.
///
/// Each book is an independently lockable resource; operations on books of
/// different symbols or sides proceed in parallel.
pub struct BookManager<B> {
    make: fn() -> B,
    buy_books: DashMap<String, Arc<Mutex<B>>>,
    sell_books: DashMap<String, Arc<Mutex<B>>>,
}

#[allow(unused)]
impl<B: Book> BookManager<B> {
    pub fn new(make: fn() -> B) -> Self {
        Self {
            make,
            buy_books: DashMap::new(),
            sell_books: DashMap::new(),
        }
    }

    /// Adds an order to the book for its (side, symbol), creating the book
    /// on first use. Fails if the book rejects the order.
    pub fn add_order(&self, order: Order) -> Result<(), EngineError> {
        let books = self.side_books(order.side);
        let book = books
            .entry(order.symbol.clone())
            .or_insert_with(|| Arc::new(Mutex::new((self.make)())))
            .clone();
        let mut book = book.lock().unwrap();
        book.add(order)
    }

    /// Removes an order; `None` when the book or the order does not exist.
    pub fn remove_order(&self, symbol: &str, side: OrderSide, order_id: &Uuid) -> Option<Order> {
        let book = self.book(symbol, side)?;
        let mut book = book.lock().unwrap();
        book.remove(order_id)
    }

    pub fn book(&self, symbol: &str, side: OrderSide) -> Option<Arc<Mutex<B>>> {
        self.side_books(side).get(symbol).map(|b| b.clone())
    }

    pub fn buy_book(&self, symbol: &str) -> Option<Arc<Mutex<B>>> {
        self.book(symbol, OrderSide::Buy)
    }

    pub fn sell_book(&self, symbol: &str) -> Option<Arc<Mutex<B>>> {
        self.book(symbol, OrderSide::Sell)
    }

    /// Symbols with a registered buy-side book.
    pub fn buy_symbols(&self) -> Vec<String> {
        self.buy_books.iter().map(|e| e.key().clone()).collect()
    }

    /// All symbols known to this manager, deduplicated across sides.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .buy_books
            .iter()
            .chain(self.sell_books.iter())
            .map(|e| e.key().clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    fn side_books(&self, side: OrderSide) -> &DashMap<String, Arc<Mutex<B>>> {
        match side {
            OrderSide::Buy => &self.buy_books,
            OrderSide::Sell => &self.sell_books,
        }
    }
}
