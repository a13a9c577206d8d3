//! Reverse walk: arena handles → fully dereferenced tree for presentation.
//!
//! The expanded tree holds no handles and is not meant for further edits;
//! edits go through the forward path and fresh inserts.

use serde::{Deserialize, Serialize};

use radon_core::error::Result;
use radon_core::id::CacheRef;
use radon_core::types::ResolvedType;

use crate::cache::Cache;
use crate::markup::{
    unexpected, HierarchicalType, MarkupInput, MarkupNode, MarkupSelect, OperatorOption,
    SelectKind, SelectedOption,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedSelect {
    pub hierarchical_type: HierarchicalType,
    pub kind: SelectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub output_type: ResolvedType,
    pub selected: ExpandedOption,
    pub options: Vec<OperatorOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedOption {
    pub hierarchical_type: HierarchicalType,
    pub label: String,
    pub output_type: ResolvedType,
    pub arguments: Vec<ExpandedArgument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "markupType", rename_all = "camelCase")]
pub enum ExpandedArgument {
    Select(Box<ExpandedSelect>),
    Input(MarkupInput),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "markupType", rename_all = "camelCase")]
pub enum ExpandedNode {
    Select(Box<ExpandedSelect>),
    Option(ExpandedOption),
    Input(MarkupInput),
}

/// Expand any handle. Dangling handles propagate as errors.
pub fn expand(cache: &Cache<MarkupNode>, handle: CacheRef) -> Result<ExpandedNode> {
    Ok(match cache.resolve(handle)? {
        MarkupNode::Select(select) => {
            ExpandedNode::Select(Box::new(expand_select_node(cache, select)?))
        }
        MarkupNode::Option(option) => ExpandedNode::Option(expand_option_node(cache, option)?),
        MarkupNode::Input(input) => ExpandedNode::Input(input.clone()),
    })
}

pub fn expand_select(cache: &Cache<MarkupNode>, handle: CacheRef) -> Result<ExpandedSelect> {
    expand_select_node(cache, cache.resolve_select(handle)?)
}

pub fn expand_script(
    cache: &Cache<MarkupNode>,
    script: &[CacheRef],
) -> Result<Vec<ExpandedSelect>> {
    #[cfg(feature = "tracing")]
    tracing::trace!(operators = script.len(), "expanding script");
    script.iter().map(|h| expand_select(cache, *h)).collect()
}

fn expand_select_node(cache: &Cache<MarkupNode>, select: &MarkupSelect) -> Result<ExpandedSelect> {
    let option = cache.resolve_option(select.selected)?;
    Ok(ExpandedSelect {
        hierarchical_type: select.kind.hierarchical_type(),
        kind: select.kind,
        label: select.label.clone(),
        output_type: select.output_type.clone(),
        selected: expand_option_node(cache, option)?,
        options: select.options.clone(),
    })
}

fn expand_option_node(
    cache: &Cache<MarkupNode>,
    option: &SelectedOption,
) -> Result<ExpandedOption> {
    let arguments = option
        .arguments
        .iter()
        .map(|h| expand_argument(cache, *h))
        .collect::<Result<Vec<_>>>()?;
    Ok(ExpandedOption {
        hierarchical_type: HierarchicalType::SelectedOperatorOption,
        label: option.label.clone(),
        output_type: option.output_type.clone(),
        arguments,
    })
}

fn expand_argument(cache: &Cache<MarkupNode>, handle: CacheRef) -> Result<ExpandedArgument> {
    match cache.resolve(handle)? {
        MarkupNode::Select(select) => Ok(ExpandedArgument::Select(Box::new(expand_select_node(
            cache, select,
        )?))),
        MarkupNode::Input(input) => Ok(ExpandedArgument::Input(input.clone())),
        other => Err(unexpected(handle, "select or input", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radon_core::error::Error;
    use radon_core::types::OutputType;

    #[test]
    fn dangling_selected_handle_propagates() {
        let mut cache = Cache::new();
        let select = cache.insert(MarkupNode::Select(MarkupSelect {
            kind: SelectKind::Reducer,
            label: None,
            output_type: OutputType::Integer.into(),
            selected: CacheRef::new(99),
            options: Vec::new(),
        })).unwrap();
        let err = expand(&cache, select).unwrap_err();
        assert!(matches!(err, Error::DanglingHandle(h) if h.id == 99));
    }

    #[test]
    fn option_as_argument_is_rejected() {
        let mut cache = Cache::new();
        let inner = cache.insert(MarkupNode::Option(SelectedOption {
            label: "min".into(),
            output_type: OutputType::Bytes.into(),
            arguments: Vec::new(),
        })).unwrap();
        let outer = cache.insert(MarkupNode::Option(SelectedOption {
            label: "reduce".into(),
            output_type: OutputType::Generic.into(),
            arguments: vec![inner],
        })).unwrap();
        let err = expand(&cache, outer).unwrap_err();
        assert!(matches!(err, Error::UnexpectedNode { found: "option", .. }));
    }
}
