pub mod order;
pub mod trade;

pub use order::{now_millis, Order, OrderSide, OrderStatus, OrderType, TriggerDirection};
pub use trade::Trade;
