//! Identifiers for decisions, options and participants.
//!
//! All three are opaque strings. Stores generate decision and option ids
//! with [`DecisionId::generate`] / [`OptionId::generate`]; participant ids
//! come from whatever identity system links the couple.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a decision.
    DecisionId
);

string_id!(
    /// Unique identifier for a decision option.
    ///
    /// Option ids change on every poll round: progression inserts fresh
    /// rows even though the titles carry over.
    OptionId
);

string_id!(
    /// Identifier of a participant (creator or partner).
    UserId
);

impl DecisionId {
    /// Generates a new random decision id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl OptionId {
    /// Generates a new random option id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
