//! Edit entry points for a UI layer.
//!
//! Every edit re-runs the forward transducer on the affected operator and
//! repoints the parent script at the fresh handle. Old nodes stay in the
//! arena untouched; they just become unreachable from the document.

use serde_json::Value;

use radon_core::error::{Error, Result};
use radon_core::id::CacheRef;
use radon_core::mir::{MirArgument, MirOperator};

use crate::decode::decode;
use crate::lower::lower_operator;
use crate::markup::{MarkupNode, SelectKind};
use crate::metrics::{record_conversion, ConversionStats};
use crate::request::{missing_source, CachedSource, RadonMarkup, Stage};

impl<'c> RadonMarkup<'c> {
    /// Replace the operator at `index` with another option of the same
    /// select. Required arguments are seeded with defaults for their kind.
    pub fn select_operator(&mut self, stage: Stage, index: usize, label: &str) -> Result<CacheRef> {
        let handle = self.operator_handle(stage, index)?;
        let category = match self.cache.resolve_select(handle)?.kind {
            SelectKind::Operator { category } => category,
            SelectKind::Filter | SelectKind::Reducer => {
                return Err(Error::Invariant(format!(
                    "{stage}[{index}] is not an operator select"
                )))
            }
        };
        let code = self
            .catalog
            .code_for(category, label)
            .ok_or_else(|| Error::UnknownOption {
                scope: format!("{category} operators"),
                label: label.to_string(),
            })?;
        let info = self.catalog.operator_info(code)?;
        let args = info
            .arguments
            .iter()
            .take_while(|a| !a.optional)
            .map(|a| a.kind.default_value())
            .collect();
        self.replace_operator(stage, index, &MirOperator::call(code, args))
    }

    /// Set argument `arg_index` of the operator at `index` to a raw compact
    /// value. Missing earlier arguments are filled with kind defaults.
    pub fn update_argument(
        &mut self,
        stage: Stage,
        index: usize,
        arg_index: usize,
        value: Value,
    ) -> Result<CacheRef> {
        let handle = self.operator_handle(stage, index)?;
        let current = lower_operator(self.catalog, &self.cache, handle)?;
        let (code, args) = decode(&current)?;
        let info = self.catalog.operator_info(code)?;
        if arg_index >= info.arguments.len() {
            return Err(Error::OutOfRange(format!(
                "`{}` has {} argument(s), no index {arg_index}",
                info.name,
                info.arguments.len()
            )));
        }
        let mut args: Vec<MirArgument> = args.map(<[_]>::to_vec).unwrap_or_default();
        while args.len() <= arg_index {
            args.push(info.arguments[args.len()].kind.default_value());
        }
        args[arg_index] = value;
        self.replace_operator(stage, index, &MirOperator::call(code, args))
    }

    /// Regenerate the operator at `index` from compact form.
    pub fn replace_operator(
        &mut self,
        stage: Stage,
        index: usize,
        operator: &MirOperator,
    ) -> Result<CacheRef> {
        self.operator_handle(stage, index)?;
        let fresh = self.insert_operator(stage, operator)?;
        self.script_mut(stage)?[index] = fresh;
        #[cfg(feature = "tracing")]
        tracing::debug!(%stage, index, id = fresh.id, "replaced operator");
        Ok(fresh)
    }

    pub fn push_operator(&mut self, stage: Stage, operator: &MirOperator) -> Result<CacheRef> {
        self.script(stage)?;
        let fresh = self.insert_operator(stage, operator)?;
        self.script_mut(stage)?.push(fresh);
        Ok(fresh)
    }

    /// Detach the operator at `index`. Its nodes remain resolvable.
    pub fn remove_operator(&mut self, stage: Stage, index: usize) -> Result<CacheRef> {
        self.operator_handle(stage, index)?;
        Ok(self.script_mut(stage)?.remove(index))
    }

    /// Append a retrieval source with an empty script; returns its index.
    pub fn add_source(&mut self, url: impl Into<String>) -> usize {
        let retrieve = &mut self.cached.rad_request.retrieve;
        retrieve.push(CachedSource {
            url: url.into(),
            script: Vec::new(),
        });
        retrieve.len() - 1
    }

    pub fn remove_source(&mut self, i: usize) -> Result<CachedSource> {
        let retrieve = &mut self.cached.rad_request.retrieve;
        if i >= retrieve.len() {
            return Err(missing_source(i));
        }
        Ok(retrieve.remove(i))
    }

    pub fn set_source_url(&mut self, i: usize, url: impl Into<String>) -> Result<()> {
        let source = self
            .cached
            .rad_request
            .retrieve
            .get_mut(i)
            .ok_or_else(|| missing_source(i))?;
        source.url = url.into();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.cached.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.cached.description = description.into();
    }

    fn operator_handle(&self, stage: Stage, index: usize) -> Result<CacheRef> {
        self.script(stage)?
            .get(index)
            .copied()
            .ok_or_else(|| Error::OutOfRange(format!("{stage} has no operator at index {index}")))
    }

    fn insert_operator(&mut self, stage: Stage, operator: &MirOperator) -> Result<CacheRef> {
        let generator = self.generator();
        let planned = generator.plan_operator(operator)?;
        let nodes = planned.node_count();
        self.cache.ensure_room(nodes)?;
        let first = self.cache.next_handle();
        let select = generator.commit_operator(&mut self.cache, planned)?;
        let handle = self.cache.insert(MarkupNode::Select(select))?;
        record_conversion(
            Some(stage),
            &ConversionStats {
                sources: 0,
                operators: 1,
                nodes,
                first,
            },
        );
        Ok(handle)
    }
}
