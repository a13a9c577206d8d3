//! Lowering: arena handles → compact form.
//!
//! Option labels map back to codes through the select's category (operator
//! selects) or the filter/reducer enumerations (argument selects). A chosen
//! option without arguments lowers to a bare code.

use serde_json::Value;

use radon_core::catalog::Catalog;
use radon_core::error::{Error, Result};
use radon_core::id::CacheRef;
use radon_core::mir::{MirArgument, MirOperator, MirScript};
use radon_core::types::{Filter, Reducer};

use crate::cache::Cache;
use crate::generate::FILTER_OPERAND_LABEL;
use crate::markup::{unexpected, MarkupNode, MarkupSelect, SelectKind};

pub fn lower_script(
    catalog: &Catalog,
    cache: &Cache<MarkupNode>,
    script: &[CacheRef],
) -> Result<MirScript> {
    script
        .iter()
        .map(|h| lower_operator(catalog, cache, *h))
        .collect()
}

pub fn lower_operator(
    catalog: &Catalog,
    cache: &Cache<MarkupNode>,
    handle: CacheRef,
) -> Result<MirOperator> {
    let select = cache.resolve_select(handle)?;
    let category = match select.kind {
        SelectKind::Operator { category } => category,
        SelectKind::Filter | SelectKind::Reducer => {
            return Err(Error::Invariant(format!(
                "{handle} is an argument select, not a pipeline operator"
            )))
        }
    };
    let option = cache.resolve_option(select.selected)?;
    let code = catalog
        .code_for(category, &option.label)
        .ok_or_else(|| Error::UnknownOption {
            scope: format!("{category} operators"),
            label: option.label.clone(),
        })?;
    let args = option
        .arguments
        .iter()
        .map(|h| lower_argument(cache, *h))
        .collect::<Result<Vec<_>>>()?;
    #[cfg(feature = "tracing")]
    tracing::trace!(handle = handle.id, code = %code, args = args.len(), "lowered operator");
    Ok(MirOperator::call(code, args))
}

fn lower_argument(cache: &Cache<MarkupNode>, handle: CacheRef) -> Result<MirArgument> {
    match cache.resolve(handle)? {
        MarkupNode::Input(input) => Ok(input.value.clone()),
        MarkupNode::Select(select) => lower_argument_select(cache, handle, select),
        other => Err(unexpected(handle, "select or input", other)),
    }
}

fn lower_argument_select(
    cache: &Cache<MarkupNode>,
    handle: CacheRef,
    select: &MarkupSelect,
) -> Result<MirArgument> {
    let option = cache.resolve_option(select.selected)?;
    match select.kind {
        SelectKind::Filter => {
            let filter = Filter::from_name(&option.label).ok_or_else(|| Error::UnknownOption {
                scope: "filters".into(),
                label: option.label.clone(),
            })?;
            let by = option.arguments.first().ok_or_else(|| {
                Error::Invariant(format!(
                    "filter option under {handle} has no `{FILTER_OPERAND_LABEL}` input"
                ))
            })?;
            let operand = cache.resolve_input(*by)?.value.clone();
            Ok(Value::Array(vec![Value::from(filter.code()), operand]))
        }
        SelectKind::Reducer => {
            let reducer = Reducer::from_name(&option.label).ok_or_else(|| Error::UnknownOption {
                scope: "reducers".into(),
                label: option.label.clone(),
            })?;
            Ok(Value::from(reducer.code()))
        }
        SelectKind::Operator { .. } => Err(Error::Invariant(format!(
            "operator select {handle} nested as an argument"
        ))),
    }
}
