//! Application Layer
//!
//! The application layer orchestrates domain logic against the daemon.
//! It defines:
//!
//! - **Ports**: Interfaces to the daemon's quote and trade channels
//! - **Services**: The gateway session
//! - **Use Cases**: Application-specific flows built on the session

pub mod errors;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use errors::{ConnectionError, GatewayError};
pub use ports::*;
pub use services::*;
pub use use_cases::*;
