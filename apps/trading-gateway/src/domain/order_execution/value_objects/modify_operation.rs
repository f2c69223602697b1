//! Order modification operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a `modify_order` call asks the daemon to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifyOperation {
    /// Amend quantity and price.
    Normal,
    /// Cancel the order.
    Cancel,
}

impl fmt::Display for ModifyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Cancel => write!(f, "CANCEL"),
        }
    }
}
