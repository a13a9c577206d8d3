//! Strongly-typed identifiers used across the markup layer.
//!
//! Downstream code should *not* pass raw integers around for operator codes
//! or arena handles.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! new_id {
    ($name:ident, $repr:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            pub const fn new(v: $repr) -> Self {
                Self(v)
            }
            pub const fn get(self) -> $repr {
                self.0
            }
        }
    };
}

// As wide as a JSON integer: any non-negative head is a code, and codes no
// catalog knows surface as `UnknownOperator`. Built-in codes fit in a byte.
new_id!(OperatorCode, u64);

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Handle into a markup arena.
///
/// Serialized as `{ "id": n }`. Only meaningful together with the arena that
/// minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
pub struct CacheRef {
    pub id: u32,
}

impl CacheRef {
    pub const fn new(id: u32) -> Self {
        Self { id }
    }
    pub const fn get(self) -> u32 {
        self.id
    }
}

impl fmt::Display for CacheRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheRef({})", self.id)
    }
}
