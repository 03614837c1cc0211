use crate::engine::entry::{Order, OrderSide, OrderType};
use crate::engine::error::EngineError;
use crate::engine::processing::{OrderProcessor, ProcessingContext, ProcessingResult};

/// Monitors resting GTT orders and fires the ones whose trigger condition
/// is met by the cycle's LTP snapshot.
///
/// A fired order leaves its GTT book and re-enters the router as a market
/// order with the same id, price and remaining quantity; its creation
/// timestamp is reset to the cycle timestamp so the market-order expiry
/// clock starts at trigger time.
#[derive(Debug, Default)]
pub struct GttOrderProcessor;

impl OrderProcessor for GttOrderProcessor {
    fn name(&self) -> &'static str {
        "gtt"
    }

    fn process(&self, context: &ProcessingContext) -> Result<ProcessingResult, EngineError> {
        let mut result = ProcessingResult::new();
        let manager = context.router().gtt_books();

        for symbol in manager.symbols() {
            // No trade yet means nothing to trigger against.
            let Some(ltp) = context.ltp(&symbol) else {
                continue;
            };

            for side in [OrderSide::Buy, OrderSide::Sell] {
                let Some(book) = manager.book(&symbol, side) else {
                    continue;
                };
                // Collect under the book's lock, re-route after releasing it.
                let fired: Vec<Order> = {
                    let book = book.lock().unwrap();
                    book.iter().filter(|o| o.trigger_hit(ltp)).cloned().collect()
                };

                for order in fired {
                    let Some(mut market_order) = manager.remove_order(&symbol, side, &order.id)
                    else {
                        continue;
                    };
                    market_order.order_type = OrderType::Market;
                    market_order.created_at = context.cycle_timestamp();
                    if let Err(e) = context.router().add_order(market_order.clone()) {
                        log::error!(
                            "failed to re-route triggered GTT order {}: {}",
                            market_order.id,
                            e
                        );
                        continue;
                    }
                    log::debug!(
                        "GTT order {} triggered at ltp {} for {}",
                        market_order.id,
                        ltp,
                        symbol
                    );
                    result.add_processed_order(market_order);
                }
            }
        }
        Ok(result)
    }
}
