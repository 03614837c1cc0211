//! Exchange Façade
//!
//! The single entry point over the engine: routes validated orders and
//! cancellations from the ingress, exposes the cycle and price-tick
//! triggers for the schedulers, and owns the shared price stores.

use crate::engine::entry::{Order, OrderStatus, OrderType};
use crate::engine::error::EngineError;
use crate::engine::pricing::{LtpStore, PriceEngine, PriceHistorySink, PriceModel, ReferencePrices};
use crate::engine::processing::{CommitSink, CycleOutcome, NotificationSink, ProcessingOrchestrator};
use crate::engine::routing::BookRouter;
use crate::metrics;
use std::sync::Arc;

pub struct Exchange {
    router: Arc<BookRouter>,
    ltp: Arc<LtpStore>,
    reference: Arc<ReferencePrices>,
    orchestrator: ProcessingOrchestrator,
    price_engine: PriceEngine,
}

#[allow(unused)]
impl Exchange {
    pub fn new(
        model: PriceModel,
        history: Arc<dyn PriceHistorySink>,
        commit: Arc<dyn CommitSink>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        let router = Arc::new(BookRouter::new());
        let ltp = Arc::new(LtpStore::new());
        let reference = Arc::new(ReferencePrices::new());
        let orchestrator = ProcessingOrchestrator::new(
            router.clone(),
            ltp.clone(),
            history.clone(),
            commit,
            notifications,
        );
        let price_engine = PriceEngine::new(model, reference.clone(), router.clone(), history);
        Self {
            router,
            ltp,
            reference,
            orchestrator,
            price_engine,
        }
    }

    /// Accepts a validated order from the ingress and routes it into its
    /// book. Market orders submitted without a price are stamped with the
    /// symbol's current reference price before routing, so the books never
    /// see a priceless order.
    pub fn place_order(&self, mut order: Order) -> Result<(), EngineError> {
        if order.order_type == OrderType::Market && order.price.is_none() {
            order.price = Some(self.reference.get_or_default(&order.symbol));
        }
        metrics::ORDER_COUNTER_VEC
            .with_label_values(&[type_label(order.order_type)])
            .inc();
        self.router.add_order(order)
    }

    /// Cancels a resting order. Returns the removed order stamped
    /// `Cancelled` for the caller to persist and notify, or `None` when the
    /// order was not resting in any book.
    pub fn cancel_order(&self, order: &Order) -> Option<Order> {
        let mut removed = self.router.remove_order(order)?;
        removed.status = OrderStatus::Cancelled;
        Some(removed)
    }

    /// Triggers one processing cycle; overlapping triggers collapse.
    pub fn run_cycle(&self) -> CycleOutcome {
        self.orchestrator.run_cycle()
    }

    /// One synthetic price-engine tick over all known symbols.
    pub fn price_tick(&self) {
        self.price_engine.tick();
    }

    pub fn router(&self) -> &Arc<BookRouter> {
        &self.router
    }

    pub fn ltp(&self) -> &Arc<LtpStore> {
        &self.ltp
    }

    pub fn reference_prices(&self) -> &Arc<ReferencePrices> {
        &self.reference
    }
}

fn type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "market",
        OrderType::Limit => "limit",
        OrderType::Gtt => "gtt",
        OrderType::Ioc => "ioc",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entry::OrderSide;
    use crate::engine::pricing::{PriceSample, DEFAULT_REFERENCE_PRICE};
    use crate::engine::processing::ProcessingResult;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    struct NullHistory;

    impl PriceHistorySink for NullHistory {
        fn record(&self, _sample: PriceSample) {}
    }

    struct NullCommit;

    impl CommitSink for NullCommit {
        fn commit(&self, _results: &[ProcessingResult]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct NullNotifications;

    impl NotificationSink for NullNotifications {
        fn order_updated(&self, _order: &Order) {}
    }

    fn exchange() -> Exchange {
        Exchange::new(
            PriceModel::default(),
            Arc::new(NullHistory),
            Arc::new(NullCommit),
            Arc::new(NullNotifications),
        )
    }

    #[test]
    fn priceless_market_orders_get_the_reference_price() {
        let exchange = exchange();
        let order = Order::market(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "AAPL".into(),
            OrderSide::Buy,
            10,
            None,
        );
        exchange.place_order(order.clone()).unwrap();

        let book = exchange.router().market_books().buy_book("AAPL").unwrap();
        let book = book.lock().unwrap();
        assert_eq!(
            book.peek_oldest().unwrap().price,
            Some(DEFAULT_REFERENCE_PRICE)
        );
    }

    #[test]
    fn quoted_market_orders_keep_their_price() {
        let exchange = exchange();
        exchange.reference_prices().set("AAPL", dec!(50));
        let order = Order::market(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "AAPL".into(),
            OrderSide::Sell,
            5,
            Some(dec!(49.50)),
        );
        exchange.place_order(order).unwrap();

        let book = exchange.router().market_books().sell_book("AAPL").unwrap();
        let book = book.lock().unwrap();
        assert_eq!(book.peek_oldest().unwrap().price, Some(dec!(49.50)));
    }

    #[test]
    fn cancelled_orders_come_back_stamped() {
        let exchange = exchange();
        let order = Order::limit(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "AAPL".into(),
            OrderSide::Buy,
            5,
            dec!(10),
        );
        exchange.place_order(order.clone()).unwrap();

        let cancelled = exchange.cancel_order(&order).unwrap();
        assert_eq!(cancelled.id, order.id);
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(exchange.cancel_order(&order).is_none());
    }
}
