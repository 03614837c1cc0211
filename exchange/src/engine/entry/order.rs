use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Milliseconds since the Unix epoch, the timestamp unit used across the engine.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderType {
    #[default]
    Market,
    Limit,
    Gtt,
    Ioc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderSide {
    #[default]
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Open,
    Partial,
    Filled,
    Cancelled,
    Expired,
    Rejected,
}

/// Condition under which a GTT order fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerDirection {
    /// Fire when the last traded price rises to or above the trigger price.
    Above,
    /// Fire when the last traded price falls to or below the trigger price.
    Below,
}

/// A universal order record covering all supported order types.
///
/// Identity and `created_at` are assigned by the ingress before the order
/// reaches the engine; the engine never mints order ids. `quantity` is the
/// remaining quantity and is decremented on every partial fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: u64,
    /// Quoted price. Stored market orders carry one too; it doubles as the
    /// tie-break price during matching.
    pub price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
    pub trigger_direction: Option<TriggerDirection>,
    pub status: OrderStatus,
    pub created_at: u64,
}

#[allow(unused)]
impl Order {
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        symbol: String,
        side: OrderSide,
        order_type: OrderType,
        quantity: u64,
        price: Option<Decimal>,
    ) -> Self {
        Self {
            id,
            user_id,
            symbol,
            side,
            order_type,
            quantity,
            price,
            trigger_price: None,
            trigger_direction: None,
            status: OrderStatus::Open,
            created_at: now_millis(),
        }
    }

    /// A market order; `price` may be absent and is then stamped from the
    /// symbol's reference price before the order is routed.
    pub fn market(
        id: Uuid,
        user_id: Uuid,
        symbol: String,
        side: OrderSide,
        quantity: u64,
        price: Option<Decimal>,
    ) -> Self {
        Self::new(id, user_id, symbol, side, OrderType::Market, quantity, price)
    }

    pub fn limit(
        id: Uuid,
        user_id: Uuid,
        symbol: String,
        side: OrderSide,
        quantity: u64,
        price: Decimal,
    ) -> Self {
        Self::new(id, user_id, symbol, side, OrderType::Limit, quantity, Some(price))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn gtt(
        id: Uuid,
        user_id: Uuid,
        symbol: String,
        side: OrderSide,
        quantity: u64,
        price: Decimal,
        trigger_price: Decimal,
        trigger_direction: TriggerDirection,
    ) -> Self {
        let mut order = Self::new(id, user_id, symbol, side, OrderType::Gtt, quantity, Some(price));
        order.trigger_price = Some(trigger_price);
        order.trigger_direction = Some(trigger_direction);
        order
    }

    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, OrderStatus::Open | OrderStatus::Partial)
    }

    /// Whether this order's GTT trigger fires against the given last traded
    /// price. Always false for orders without trigger data.
    pub fn trigger_hit(&self, ltp: Decimal) -> bool {
        match (self.trigger_price, self.trigger_direction) {
            (Some(trigger), Some(TriggerDirection::Above)) => ltp >= trigger,
            (Some(trigger), Some(TriggerDirection::Below)) => ltp <= trigger,
            _ => false,
        }
    }
}
