use crate::engine::data::MarketOrderBook;
use crate::engine::entry::{now_millis, Order, OrderStatus, Trade};
use crate::engine::error::EngineError;
use crate::engine::processing::{OrderProcessor, ProcessingContext, ProcessingResult};
use std::sync::MutexGuard;
use uuid::Uuid;

/// Resting market orders older than this are expired instead of matched.
const MARKET_ORDER_EXPIRY_MS: u64 = 5 * 60 * 1000;

/// Matches resting market orders symbol by symbol.
///
/// Buy side is consumed in strict arrival order; the opposing sell is
/// always the lowest-priced one (price priority, not time priority, on the
/// sell side).
#[derive(Debug, Default)]
pub struct MarketOrderProcessor;

impl OrderProcessor for MarketOrderProcessor {
    fn name(&self) -> &'static str {
        "market"
    }

    fn process(&self, context: &ProcessingContext) -> Result<ProcessingResult, EngineError> {
        let mut result = ProcessingResult::new();
        for symbol in context.router().market_books().buy_symbols() {
            self.process_symbol(&symbol, context, &mut result);
        }
        Ok(result)
    }
}

impl MarketOrderProcessor {
    fn process_symbol(&self, symbol: &str, context: &ProcessingContext, result: &mut ProcessingResult) {
        let manager = context.router().market_books();
        let Some(buy_book) = manager.buy_book(symbol) else {
            return;
        };
        let Some(sell_book) = manager.sell_book(symbol) else {
            return;
        };
        // Two-lock region; buy before sell everywhere in the engine.
        let mut buy_book = buy_book.lock().unwrap();
        let mut sell_book = sell_book.lock().unwrap();

        while !buy_book.is_empty() && !sell_book.is_empty() {
            let Some(buy_order) = buy_book.peek_oldest().cloned() else {
                break;
            };
            if is_expired(&buy_order, context.cycle_timestamp()) {
                expire(&mut buy_book, buy_order, result);
                continue;
            }

            let Some(sell_order) = sell_book.lowest_price_order().cloned() else {
                break;
            };
            if is_expired(&sell_order, context.cycle_timestamp()) {
                // Expire and retry with the next-lowest sell.
                expire(&mut sell_book, sell_order, result);
                continue;
            }

            execute_match(
                &buy_order,
                &sell_order,
                &mut buy_book,
                &mut sell_book,
                context,
                result,
            );
        }
    }
}

fn execute_match(
    buy_order: &Order,
    sell_order: &Order,
    buy_book: &mut MutexGuard<'_, MarketOrderBook>,
    sell_book: &mut MutexGuard<'_, MarketOrderBook>,
    context: &ProcessingContext,
    result: &mut ProcessingResult,
) {
    // The resting (older) order's counterparty gets no price improvement:
    // the execution price is taken from the newer of the two orders.
    let execution_price = if buy_order.created_at < sell_order.created_at {
        sell_order.price
    } else {
        buy_order.price
    }
    .expect("stored market orders carry a price");
    let execution_qty = buy_order.quantity.min(sell_order.quantity);

    context.ltp_store().update(&buy_order.symbol, execution_price);
    context.history().record(crate::engine::pricing::PriceSample {
        symbol: buy_order.symbol.clone(),
        price: execution_price,
        quantity: execution_qty,
        at: now_millis(),
    });

    result.add_trade(Trade::new(
        Uuid::new_v4(),
        buy_order.symbol.clone(),
        buy_order.id,
        sell_order.id,
        execution_price,
        execution_qty,
        now_millis(),
    ));

    if let Some(updated) = buy_book.fill(&buy_order.id, execution_qty) {
        result.add_processed_order(updated);
    }
    if let Some(updated) = sell_book.fill(&sell_order.id, execution_qty) {
        result.add_processed_order(updated);
    }
}

fn expire(
    book: &mut MutexGuard<'_, MarketOrderBook>,
    order: Order,
    result: &mut ProcessingResult,
) {
    let mut expired = book.remove(&order.id).unwrap_or(order);
    expired.status = OrderStatus::Expired;
    result.add_processed_order(expired);
}

fn is_expired(order: &Order, cycle_timestamp: u64) -> bool {
    cycle_timestamp.saturating_sub(order.created_at) > MARKET_ORDER_EXPIRY_MS
}
