//! YAML/JSON loaders for compact documents and operator catalogs.
//!
//! Example document:
//! ```yaml
//! name: bitcoin price
//! description: coindesk rate
//! radRequest:
//!   notBefore: 0
//!   retrieve:
//!     - url: "https://api.coindesk.com/v1/bpi/currentprice.json"
//!       script: [118, [97, "bpi"], [97, "USD"], [97, "rate_float"]]
//!   aggregate: [[17, [5, 1.5]], [27, 3]]
//!   tally: [[27, 3]]
//! ```
//!
//! JSON parses through the same path.

use radon_core::catalog::Catalog;
use radon_core::error::Result;
use radon_core::mir::Mir;

/// Parse a compact document from YAML or JSON text.
pub fn parse_mir(src: &str) -> Result<Mir> {
    let mir: Mir = serde_yaml::from_str(src)?;
    Ok(mir)
}

/// Parse an operator catalog (`operators: [...]`) from YAML or JSON text.
pub fn parse_catalog(src: &str) -> Result<Catalog> {
    let catalog: Catalog = serde_yaml::from_str(src)?;
    Ok(catalog)
}

pub fn catalog_to_yaml(catalog: &Catalog) -> Result<String> {
    Ok(serde_yaml::to_string(catalog)?)
}
