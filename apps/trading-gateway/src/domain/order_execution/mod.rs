//! Order Execution Bounded Context
//!
//! Order requests, the records the daemon returns for them, and the
//! environment tag that follows an order through its lifecycle.

pub mod intent;
pub mod records;
pub mod value_objects;

pub use intent::OrderIntent;
pub use records::{Deal, OrderRecord};
pub use value_objects::{ModifyOperation, OrderKind, OrderSide, OrderStatus, TradingEnvironment};
