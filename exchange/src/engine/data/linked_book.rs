use crate::engine::entry::{Order, OrderType};
use crate::engine::error::EngineError;
use fxhash::FxHashMap;
use uuid::Uuid;

#[derive(Debug)]
struct Node {
    order: Order,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Arrival-ordered book for resting limit and GTT orders of one symbol/side.
///
/// One arena-indexed doubly linked list serves both variants; the accepted
/// order type is fixed at construction and acts as the eligibility check on
/// `add`. A side table maps order id to arena slot so removal by id unlinks
/// in O(1). Freed slots are recycled through a free list.
#[derive(Debug)]
pub struct LinkedOrderBook {
    kind: OrderType,
    arena: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    index: FxHashMap<Uuid, usize>,
}

#[allow(unused)]
impl LinkedOrderBook {
    pub fn limit() -> Self {
        Self::with_kind(OrderType::Limit)
    }

    pub fn gtt() -> Self {
        Self::with_kind(OrderType::Gtt)
    }

    fn with_kind(kind: OrderType) -> Self {
        Self {
            kind,
            arena: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            index: FxHashMap::default(),
        }
    }

    pub fn kind(&self) -> OrderType {
        self.kind
    }

    /// Appends an order at the tail in O(1).
    pub fn add(&mut self, order: Order) -> Result<(), EngineError> {
        if order.order_type != self.kind {
            return Err(EngineError::InvalidOrderKind {
                expected: self.kind,
                actual: order.order_type,
                id: order.id,
            });
        }
        if order.price.is_none() {
            return Err(EngineError::MissingPrice { id: order.id });
        }

        let id = order.id;
        let node = Node {
            order,
            prev: self.tail,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.arena[slot] = Some(node);
                slot
            }
            None => {
                self.arena.push(Some(node));
                self.arena.len() - 1
            }
        };

        match self.tail {
            Some(tail) => {
                self.arena[tail].as_mut().unwrap().next = Some(slot);
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.index.insert(id, slot);
        Ok(())
    }

    /// Unlinks an order by id in O(1). Returns the removed order, or `None`
    /// if the id is not present in this book.
    pub fn remove(&mut self, order_id: &Uuid) -> Option<Order> {
        let slot = self.index.remove(order_id)?;
        let node = self.arena[slot].take().expect("side table points at a live slot");
        self.free.push(slot);

        match node.prev {
            Some(prev) => self.arena[prev].as_mut().unwrap().next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.arena[next].as_mut().unwrap().prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.order)
    }

    /// Head-to-tail traversal in arrival order. The caller must hold this
    /// book's lock for the whole traversal; the sequence is not restartable
    /// across mutations.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            book: self,
            cursor: self.head,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

pub struct Iter<'a> {
    book: &'a LinkedOrderBook,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.book.arena[slot].as_ref().expect("linked slot is live");
        self.cursor = node.next;
        Some(&node.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entry::{OrderSide, TriggerDirection};
    use rust_decimal_macros::dec;

    fn limit_order(symbol: &str, qty: u64) -> Order {
        Order::limit(
            Uuid::new_v4(),
            Uuid::new_v4(),
            symbol.to_string(),
            OrderSide::Buy,
            qty,
            dec!(101.50),
        )
    }

    #[test]
    fn add_then_remove_restores_book() {
        let mut book = LinkedOrderBook::limit();
        let first = limit_order("AAPL", 10);
        let second = limit_order("AAPL", 20);
        book.add(first.clone()).unwrap();
        let before: Vec<Uuid> = book.iter().map(|o| o.id).collect();

        book.add(second.clone()).unwrap();
        assert_eq!(book.len(), 2);
        let removed = book.remove(&second.id).unwrap();
        assert_eq!(removed.id, second.id);

        assert_eq!(book.len(), 1);
        let after: Vec<Uuid> = book.iter().map(|o| o.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn remove_missing_id_returns_none() {
        let mut book = LinkedOrderBook::limit();
        book.add(limit_order("AAPL", 10)).unwrap();
        assert!(book.remove(&Uuid::new_v4()).is_none());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn rejects_wrong_order_type() {
        let mut book = LinkedOrderBook::gtt();
        let err = book.add(limit_order("AAPL", 10)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOrderKind { .. }));
        assert!(book.is_empty());
    }

    #[test]
    fn rejects_missing_price() {
        let mut book = LinkedOrderBook::limit();
        let mut order = limit_order("AAPL", 10);
        order.price = None;
        let err = book.add(order).unwrap_err();
        assert!(matches!(err, EngineError::MissingPrice { .. }));
    }

    #[test]
    fn iteration_follows_arrival_order_across_removals() {
        let mut book = LinkedOrderBook::limit();
        let orders: Vec<Order> = (0..5).map(|i| limit_order("AAPL", i + 1)).collect();
        for order in &orders {
            book.add(order.clone()).unwrap();
        }

        // Remove head, middle and tail; the survivors keep arrival order.
        book.remove(&orders[0].id).unwrap();
        book.remove(&orders[2].id).unwrap();
        book.remove(&orders[4].id).unwrap();

        let remaining: Vec<Uuid> = book.iter().map(|o| o.id).collect();
        assert_eq!(remaining, vec![orders[1].id, orders[3].id]);
    }

    #[test]
    fn freed_slots_are_recycled() {
        let mut book = LinkedOrderBook::gtt();
        for _ in 0..3 {
            let order = Order::gtt(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "AAPL".to_string(),
                OrderSide::Sell,
                5,
                dec!(100),
                dec!(105),
                TriggerDirection::Above,
            );
            let id = order.id;
            book.add(order).unwrap();
            book.remove(&id).unwrap();
        }
        assert!(book.is_empty());
        assert_eq!(book.arena.len(), 1);
    }
}
