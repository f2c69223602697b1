//! Order Execution Value Objects
//!
//! Immutable types for order management.

mod modify_operation;
mod order_kind;
mod order_side;
mod order_status;
mod trading_environment;

pub use modify_operation::ModifyOperation;
pub use order_kind::OrderKind;
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use trading_environment::TradingEnvironment;
