#![forbid(unsafe_code)]
//! radon-markup: compact Radon scripts ⇄ arena-backed markup trees.
//!
//! Design:
//! - `cache::Cache` is an append-only arena; every node is reached through a
//!   `CacheRef` handle, never duplicated.
//! - `generate` turns compact operators into select/option/input nodes
//!   (plan first, then commit, so failures leave no nodes behind).
//! - `expand` dereferences handles into a presentation tree; `lower` walks
//!   them back to compact form.
//! - `request::RadonMarkup` assembles whole documents and carries the edit
//!   entry points from `edit`.

pub mod cache;
pub mod decode;
pub mod dsl;
pub mod edit;
pub mod expand;
pub mod generate;
pub mod lower;
pub mod markup;
pub mod metrics;
pub mod request;

pub use cache::Cache;
pub use decode::decode;
pub use dsl::yaml::{catalog_to_yaml, parse_catalog, parse_mir};
pub use expand::{
    expand, expand_script, expand_select, ExpandedArgument, ExpandedNode, ExpandedOption,
    ExpandedSelect,
};
pub use generate::{
    script_node_count, Generator, PlannedArgument, PlannedOperator, FILTER_OPERAND_LABEL,
};
pub use lower::{lower_operator, lower_script};
pub use metrics::ConversionStats;
pub use markup::{
    ArgumentOptions, HierarchicalType, MarkupInput, MarkupNode, MarkupSelect, OperatorOption,
    SelectKind, SelectedOption,
};
pub use request::{
    CachedMarkup, CachedRequest, CachedSource, Markup, MarkupRequest, MarkupSource, RadonMarkup,
    Stage,
};
