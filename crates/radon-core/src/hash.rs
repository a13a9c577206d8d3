//! Content fingerprints for documents and expanded markup.
//!
//! Values are streamed through `serde_json` straight into the hasher, so the
//! digest follows struct field order. Hash the expanded view, not the arena:
//! handle ids are an allocation detail.

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// First 12 hex chars, for log lines.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub fn hash_serde<T: Serialize>(v: &T) -> Result<Hash256> {
    let mut hasher = Hasher::new();
    serde_json::to_writer(&mut hasher, v).map_err(|e| Error::Hash(e.to_string()))?;
    Ok(Hash256(hasher.finalize().into()))
}
