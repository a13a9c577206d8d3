//! Markup node shapes stored in the arena.
//!
//! A `MarkupSelect` is a choice point: the options legal at that position
//! plus a handle to the option currently chosen. The chosen option holds
//! handles to its arguments, which are either further selects (filter and
//! reducer slots) or terminal inputs.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use radon_core::catalog::Catalog;
use radon_core::error::{Error, Result};
use radon_core::id::CacheRef;
use radon_core::types::{ArgumentKind, Filter, OutputType, Reducer, ResolvedType};

use crate::cache::Cache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HierarchicalType {
    Operator,
    Argument,
    OperatorOption,
    SelectedOperatorOption,
}

/// What a select chooses between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SelectKind {
    /// A pipeline stage; options are every operator of `category`.
    Operator { category: OutputType },
    /// A filter-kind argument slot.
    Filter,
    /// A reducer-kind argument slot.
    Reducer,
}

impl SelectKind {
    pub fn hierarchical_type(self) -> HierarchicalType {
        match self {
            SelectKind::Operator { .. } => HierarchicalType::Operator,
            SelectKind::Filter | SelectKind::Reducer => HierarchicalType::Argument,
        }
    }
}

/// Entry of a select's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorOption {
    pub label: String,
    pub output_type: ResolvedType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupSelect {
    pub kind: SelectKind,
    /// Argument name for argument selects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub output_type: ResolvedType,
    pub selected: CacheRef,
    pub options: Vec<OperatorOption>,
}

/// The option currently chosen in a select, with its bound arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    pub label: String,
    pub output_type: ResolvedType,
    pub arguments: Vec<CacheRef>,
}

/// Terminal literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupInput {
    pub label: String,
    pub kind: ArgumentKind,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "markupType", rename_all = "camelCase")]
pub enum MarkupNode {
    Select(MarkupSelect),
    Option(SelectedOption),
    Input(MarkupInput),
}

impl MarkupNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            MarkupNode::Select(_) => "select",
            MarkupNode::Option(_) => "option",
            MarkupNode::Input(_) => "input",
        }
    }
}

impl Cache<MarkupNode> {
    pub fn resolve_select(&self, handle: CacheRef) -> Result<&MarkupSelect> {
        match self.resolve(handle)? {
            MarkupNode::Select(select) => Ok(select),
            other => Err(unexpected(handle, "select", other)),
        }
    }

    pub fn resolve_option(&self, handle: CacheRef) -> Result<&SelectedOption> {
        match self.resolve(handle)? {
            MarkupNode::Option(option) => Ok(option),
            other => Err(unexpected(handle, "option", other)),
        }
    }

    pub fn resolve_input(&self, handle: CacheRef) -> Result<&MarkupInput> {
        match self.resolve(handle)? {
            MarkupNode::Input(input) => Ok(input),
            other => Err(unexpected(handle, "input", other)),
        }
    }
}

pub(crate) fn unexpected(handle: CacheRef, expected: &'static str, found: &MarkupNode) -> Error {
    Error::UnexpectedNode {
        handle,
        expected,
        found: found.kind_name(),
    }
}

/// Option lists for filter and reducer slots. Catalog-independent, built
/// once per process.
#[derive(Debug, Clone)]
pub struct ArgumentOptions {
    pub filters: Vec<OperatorOption>,
    pub reducers: Vec<OperatorOption>,
}

static ARGUMENT_OPTIONS: Lazy<ArgumentOptions> = Lazy::new(ArgumentOptions::build);

impl ArgumentOptions {
    pub fn shared() -> &'static ArgumentOptions {
        &ARGUMENT_OPTIONS
    }

    fn build() -> Self {
        let bytes = || ResolvedType::One(OutputType::Bytes);
        Self {
            filters: Filter::ALL
                .iter()
                .map(|f| OperatorOption {
                    label: f.name().to_string(),
                    output_type: bytes(),
                })
                .collect(),
            reducers: Reducer::ALL
                .iter()
                .map(|r| OperatorOption {
                    label: r.name().to_string(),
                    output_type: bytes(),
                })
                .collect(),
        }
    }
}

/// Every operator legal for `category`, in catalog order.
pub fn operator_options(catalog: &Catalog, category: OutputType) -> Vec<OperatorOption> {
    catalog
        .entries(category)
        .iter()
        .map(|e| OperatorOption {
            label: e.name.clone(),
            output_type: e.output.clone(),
        })
        .collect()
}
