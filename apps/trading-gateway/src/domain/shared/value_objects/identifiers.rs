//! Strongly-typed identifiers assigned by the daemon.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(OrderId, "Daemon-assigned identifier for an order.");
define_id!(DealId, "Daemon-assigned identifier for an execution (deal).");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_new_and_display() {
        let id = OrderId::new("7310293");
        assert_eq!(id.as_str(), "7310293");
        assert_eq!(format!("{id}"), "7310293");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(OrderId::generate(), OrderId::generate());
        assert_ne!(DealId::generate(), DealId::generate());
    }

    #[test]
    fn order_id_from_conversions() {
        let a: OrderId = "ord-1".into();
        let b: OrderId = String::from("ord-1").into();
        assert_eq!(a, b);
    }

    #[test]
    fn order_id_serializes_transparently() {
        let id = OrderId::new("ord-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ord-123\"");
    }
}
