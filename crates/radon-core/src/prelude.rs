//! Convenient re-exports for downstream crates.

pub use crate::catalog::{ArgumentInfo, Catalog, OperatorDef, OperatorInfo, TypeSystemEntry};
pub use crate::config::MarkupConfig;
pub use crate::error::{Error, Result};
pub use crate::hash::{hash_serde, Hash256};
pub use crate::id::{CacheRef, OperatorCode};
pub use crate::mir::{Mir, MirArgument, MirOperator, MirRequest, MirScript, MirSource};
pub use crate::types::{ArgumentKind, Filter, OutputType, Reducer, ResolvedType};
