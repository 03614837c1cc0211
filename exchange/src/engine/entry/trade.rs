//! Trade Types and Structures
//!
//! A trade represents a completed transaction between a buy order and a
//! sell order. Trades are created only by order processors during a
//! processing cycle and are immutable once created.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an executed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Unique identifier for the trade
    pub id: Uuid,
    /// Traded symbol
    pub symbol: String,
    /// ID of the buy order that was part of the trade
    pub buy_order_id: Uuid,
    /// ID of the sell order that was part of the trade
    pub sell_order_id: Uuid,
    /// Price at which the trade was executed
    pub price: Decimal,
    /// Executed quantity
    pub quantity: u64,
    /// Execution timestamp, milliseconds since the Unix epoch
    pub executed_at: u64,
}

#[allow(unused)]
impl Trade {
    pub fn new(
        id: Uuid,
        symbol: String,
        buy_order_id: Uuid,
        sell_order_id: Uuid,
        price: Decimal,
        quantity: u64,
        executed_at: u64,
    ) -> Self {
        Self {
            id,
            symbol,
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            executed_at,
        }
    }

    /// Total notional value of the trade.
    pub fn total_amount(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
