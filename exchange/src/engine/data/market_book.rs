use crate::engine::entry::{Order, OrderStatus, OrderType};
use crate::engine::error::EngineError;
use fxhash::FxHashMap;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};
use uuid::Uuid;

/// Book of resting market orders for one symbol/side.
///
/// Three coupled structures: an id table owning the orders, a price-sorted
/// table of FIFO buckets, and a single arrival-ordered FIFO queue. The
/// queues hold ids only, so an order id is present in all three structures
/// or in none. Every mutation goes through methods of this type; nothing
/// outside may touch one structure without the others.
#[derive(Debug, Default)]
pub struct MarketOrderBook {
    orders_by_id: FxHashMap<Uuid, Order>,
    orders_by_price: BTreeMap<Decimal, VecDeque<Uuid>>,
    fifo: VecDeque<Uuid>,
}

#[allow(unused)]
impl MarketOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.orders_by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders_by_id.len()
    }

    /// Inserts a market order into all three structures.
    pub fn add(&mut self, order: Order) -> Result<(), EngineError> {
        if order.order_type != OrderType::Market {
            return Err(EngineError::InvalidOrderKind {
                expected: OrderType::Market,
                actual: order.order_type,
                id: order.id,
            });
        }
        let Some(price) = order.price else {
            return Err(EngineError::MissingPrice { id: order.id });
        };

        let id = order.id;
        self.orders_by_id.insert(id, order);
        self.orders_by_price.entry(price).or_default().push_back(id);
        self.fifo.push_back(id);
        Ok(())
    }

    /// Removes an order by id from all three structures. The FIFO scan is
    /// O(n); acceptable for cancellations, processing uses `poll_oldest`.
    pub fn remove(&mut self, order_id: &Uuid) -> Option<Order> {
        let order = self.orders_by_id.remove(order_id)?;
        self.drop_from_price_table(&order);
        self.fifo.retain(|id| id != order_id);
        Some(order)
    }

    /// The oldest resting order, without removing it.
    pub fn peek_oldest(&self) -> Option<&Order> {
        self.fifo.front().map(|id| &self.orders_by_id[id])
    }

    /// Removes and returns the oldest order, cleaning up the other two
    /// structures. Primary removal path for the matching algorithm.
    pub fn poll_oldest(&mut self) -> Option<Order> {
        let id = self.fifo.pop_front()?;
        let order = self
            .orders_by_id
            .remove(&id)
            .expect("fifo id is present in the id table");
        self.drop_from_price_table(&order);
        Some(order)
    }

    pub fn lowest_price_order(&self) -> Option<&Order> {
        let (_, bucket) = self.orders_by_price.iter().next()?;
        bucket.front().map(|id| &self.orders_by_id[id])
    }

    pub fn highest_price_order(&self) -> Option<&Order> {
        let (_, bucket) = self.orders_by_price.iter().next_back()?;
        bucket.front().map(|id| &self.orders_by_id[id])
    }

    /// Applies a fill to a resting order: decrements its remaining quantity
    /// and either marks it `Partial` (still resting) or `Filled` and removes
    /// it from all structures. Returns the updated order snapshot.
    pub fn fill(&mut self, order_id: &Uuid, quantity: u64) -> Option<Order> {
        let order = self.orders_by_id.get_mut(order_id)?;
        order.quantity = order.quantity.saturating_sub(quantity);
        if order.quantity == 0 {
            order.status = OrderStatus::Filled;
            let filled = order.clone();
            self.remove(order_id);
            Some(filled)
        } else {
            order.status = OrderStatus::Partial;
            Some(order.clone())
        }
    }

    /// Arrival-order traversal. Valid only under this book's lock.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.fifo.iter().map(|id| &self.orders_by_id[id])
    }

    fn drop_from_price_table(&mut self, order: &Order) {
        // Price presence was checked on add.
        let Some(price) = order.price else { return };
        if let Some(bucket) = self.orders_by_price.get_mut(&price) {
            bucket.retain(|id| id != &order.id);
            if bucket.is_empty() {
                self.orders_by_price.remove(&price);
            }
        }
    }

    #[cfg(test)]
    fn assert_coupled(&self) {
        let bucket_total: usize = self.orders_by_price.values().map(|b| b.len()).sum();
        assert_eq!(self.orders_by_id.len(), self.fifo.len());
        assert_eq!(self.orders_by_id.len(), bucket_total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entry::OrderSide;
    use rust_decimal_macros::dec;

    fn market_order(price: Decimal, qty: u64) -> Order {
        Order::market(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "AAPL".to_string(),
            OrderSide::Buy,
            qty,
            Some(price),
        )
    }

    #[test]
    fn structures_stay_coupled_under_mixed_operations() {
        let mut book = MarketOrderBook::new();
        let orders: Vec<Order> = [dec!(10), dec!(12), dec!(10), dec!(11), dec!(12)]
            .into_iter()
            .enumerate()
            .map(|(i, p)| market_order(p, i as u64 + 1))
            .collect();
        for order in &orders {
            book.add(order.clone()).unwrap();
            book.assert_coupled();
        }

        book.remove(&orders[3].id).unwrap();
        book.assert_coupled();
        book.poll_oldest().unwrap();
        book.assert_coupled();
        book.remove(&orders[4].id).unwrap();
        book.assert_coupled();
        book.poll_oldest().unwrap();
        book.assert_coupled();
        book.poll_oldest().unwrap();
        book.assert_coupled();
        assert!(book.is_empty());
    }

    #[test]
    fn add_then_remove_round_trips() {
        let mut book = MarketOrderBook::new();
        let resident = market_order(dec!(10), 5);
        book.add(resident.clone()).unwrap();
        let before: Vec<Uuid> = book.iter().map(|o| o.id).collect();

        let transient = market_order(dec!(9), 1);
        book.add(transient.clone()).unwrap();
        assert!(book.remove(&transient.id).is_some());

        assert_eq!(book.len(), 1);
        let after: Vec<Uuid> = book.iter().map(|o| o.id).collect();
        assert_eq!(before, after);
        book.assert_coupled();
    }

    #[test]
    fn remove_missing_id_returns_none() {
        let mut book = MarketOrderBook::new();
        book.add(market_order(dec!(10), 5)).unwrap();
        assert!(book.remove(&Uuid::new_v4()).is_none());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn rejects_non_market_orders_and_missing_prices() {
        let mut book = MarketOrderBook::new();
        let limit = Order::limit(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "AAPL".to_string(),
            OrderSide::Sell,
            5,
            dec!(10),
        );
        assert!(matches!(
            book.add(limit).unwrap_err(),
            EngineError::InvalidOrderKind { .. }
        ));

        let mut priceless = market_order(dec!(10), 5);
        priceless.price = None;
        assert!(matches!(
            book.add(priceless).unwrap_err(),
            EngineError::MissingPrice { .. }
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn poll_oldest_is_fifo_and_cleans_price_table() {
        let mut book = MarketOrderBook::new();
        let first = market_order(dec!(10), 5);
        let second = market_order(dec!(10), 7);
        book.add(first.clone()).unwrap();
        book.add(second.clone()).unwrap();

        assert_eq!(book.peek_oldest().unwrap().id, first.id);
        assert_eq!(book.poll_oldest().unwrap().id, first.id);
        book.assert_coupled();
        assert_eq!(book.poll_oldest().unwrap().id, second.id);
        assert!(book.orders_by_price.is_empty());
    }

    #[test]
    fn price_extremes_follow_bucket_fifo() {
        let mut book = MarketOrderBook::new();
        let cheap_first = market_order(dec!(9), 1);
        let cheap_second = market_order(dec!(9), 2);
        let dear = market_order(dec!(15), 3);
        book.add(cheap_first.clone()).unwrap();
        book.add(cheap_second.clone()).unwrap();
        book.add(dear.clone()).unwrap();

        assert_eq!(book.lowest_price_order().unwrap().id, cheap_first.id);
        assert_eq!(book.highest_price_order().unwrap().id, dear.id);
    }

    #[test]
    fn fill_partial_keeps_order_resting_and_filled_removes_it() {
        let mut book = MarketOrderBook::new();
        let order = market_order(dec!(10), 10);
        book.add(order.clone()).unwrap();

        let partial = book.fill(&order.id, 4).unwrap();
        assert_eq!(partial.status, OrderStatus::Partial);
        assert_eq!(partial.quantity, 6);
        assert_eq!(book.len(), 1);
        book.assert_coupled();

        let filled = book.fill(&order.id, 6).unwrap();
        assert_eq!(filled.status, OrderStatus::Filled);
        assert_eq!(filled.quantity, 0);
        assert!(book.is_empty());
        book.assert_coupled();
    }
}
