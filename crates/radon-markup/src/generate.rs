//! Forward transducer: compact script → arena handles.
//!
//! Two passes. `plan_*` resolves codes, output types and argument shapes
//! without touching the arena; every data failure happens there. Before
//! `commit_*` inserts anything, the planned node count is checked against
//! the arena's remaining ids, so an error never leaves partial nodes behind.

use serde_json::Value;

use radon_core::catalog::{ArgumentInfo, Catalog, OperatorInfo};
use radon_core::error::{Error, Result};
use radon_core::id::{CacheRef, OperatorCode};
use radon_core::mir::{MirArgument, MirOperator};
use radon_core::types::{ArgumentKind, Filter, OutputType, Reducer, ResolvedType};

use crate::cache::Cache;
use crate::decode::decode;
use crate::markup::{
    operator_options, ArgumentOptions, MarkupInput, MarkupNode, MarkupSelect, SelectKind,
    SelectedOption,
};

/// Label of the synthetic operand input under a filter option.
pub const FILTER_OPERAND_LABEL: &str = "by";

/// An operator with everything resolved; nothing inserted yet.
#[derive(Debug, Clone)]
pub struct PlannedOperator<'a> {
    pub info: &'a OperatorInfo,
    pub output_type: ResolvedType,
    pub arguments: Vec<PlannedArgument>,
}

impl PlannedOperator<'_> {
    /// Nodes `commit_operator` inserts: arguments plus the chosen option.
    pub fn option_nodes(&self) -> usize {
        1 + self
            .arguments
            .iter()
            .map(PlannedArgument::node_count)
            .sum::<usize>()
    }

    /// Nodes for the operator including its own select.
    pub fn node_count(&self) -> usize {
        self.option_nodes() + 1
    }
}

/// Total nodes committing `planned` as a script will insert.
pub fn script_node_count(planned: &[PlannedOperator<'_>]) -> usize {
    planned.iter().map(PlannedOperator::node_count).sum()
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlannedArgument {
    Input(MarkupInput),
    Filter {
        label: String,
        filter: Filter,
        operand: Value,
    },
    Reducer {
        label: String,
        reducer: Reducer,
    },
}

impl PlannedArgument {
    pub fn node_count(&self) -> usize {
        match self {
            PlannedArgument::Input(_) => 1,
            // by input, option, select
            PlannedArgument::Filter { .. } => 3,
            // option, select
            PlannedArgument::Reducer { .. } => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    catalog: &'a Catalog,
    options: &'a ArgumentOptions,
}

impl<'a> Generator<'a> {
    pub fn new(catalog: &'a Catalog, options: &'a ArgumentOptions) -> Self {
        Self { catalog, options }
    }

    /// Convert a whole script, preserving order. Nothing is inserted unless
    /// every operator plans cleanly.
    pub fn script_to_tree(
        &self,
        cache: &mut Cache<MarkupNode>,
        script: &[MirOperator],
    ) -> Result<Vec<CacheRef>> {
        let planned = self.plan_script(script)?;
        cache.ensure_room(script_node_count(&planned))?;
        self.commit_script(cache, planned)
    }

    /// Build the select for one operator. Its chosen option (and everything
    /// below) is already in the arena; the select itself is not.
    pub fn operator_to_selector(
        &self,
        cache: &mut Cache<MarkupNode>,
        operator: &MirOperator,
    ) -> Result<MarkupSelect> {
        let planned = self.plan_operator(operator)?;
        cache.ensure_room(planned.option_nodes())?;
        self.commit_operator(cache, planned)
    }

    /// Build the chosen option for `code` with its raw arguments.
    pub fn option_for_operator(
        &self,
        cache: &mut Cache<MarkupNode>,
        info: &'a OperatorInfo,
        code: OperatorCode,
        args: Option<&[MirArgument]>,
    ) -> Result<SelectedOption> {
        let output_type = self.catalog.output_type_of(code)?;
        let arguments = self.plan_arguments(info, args.unwrap_or_default())?;
        let planned = PlannedOperator {
            info,
            output_type,
            arguments,
        };
        cache.ensure_room(planned.option_nodes() - 1)?;
        self.commit_option(cache, planned)
    }

    pub fn plan_script(&self, script: &[MirOperator]) -> Result<Vec<PlannedOperator<'a>>> {
        script.iter().map(|op| self.plan_operator(op)).collect()
    }

    pub fn plan_operator(&self, operator: &MirOperator) -> Result<PlannedOperator<'a>> {
        let (code, args) = decode(operator)?;
        let output_type = self.catalog.output_type_of(code)?;
        let info = self.catalog.operator_info(code)?;
        let arguments = self.plan_arguments(info, args.unwrap_or_default())?;
        #[cfg(feature = "tracing")]
        tracing::trace!(code = %code, name = %info.name, args = arguments.len(), "planned operator");
        Ok(PlannedOperator {
            info,
            output_type,
            arguments,
        })
    }

    fn plan_arguments(
        &self,
        info: &OperatorInfo,
        args: &[MirArgument],
    ) -> Result<Vec<PlannedArgument>> {
        if args.len() > info.arguments.len() {
            return Err(Error::MalformedArgument {
                code: info.code,
                index: info.arguments.len(),
                reason: format!(
                    "`{}` takes {} argument(s), got {}",
                    info.name,
                    info.arguments.len(),
                    args.len()
                ),
            });
        }
        args.iter()
            .zip(&info.arguments)
            .enumerate()
            .map(|(index, (raw, spec))| plan_argument(info.code, index, spec, raw))
            .collect()
    }

    /// Insert planned operators in order. Callers check `ensure_room`
    /// first; an id-space error here would leave earlier operators behind.
    pub fn commit_script(
        &self,
        cache: &mut Cache<MarkupNode>,
        planned: Vec<PlannedOperator<'a>>,
    ) -> Result<Vec<CacheRef>> {
        planned
            .into_iter()
            .map(|op| {
                let select = self.commit_operator(cache, op)?;
                cache.insert(MarkupNode::Select(select))
            })
            .collect()
    }

    pub fn commit_operator(
        &self,
        cache: &mut Cache<MarkupNode>,
        planned: PlannedOperator<'a>,
    ) -> Result<MarkupSelect> {
        let category = planned.info.category;
        let output_type = planned.output_type.clone();
        let option = self.commit_option(cache, planned)?;
        let selected = cache.insert(MarkupNode::Option(option))?;
        Ok(MarkupSelect {
            kind: SelectKind::Operator { category },
            label: None,
            output_type,
            selected,
            options: operator_options(self.catalog, category),
        })
    }

    fn commit_option(
        &self,
        cache: &mut Cache<MarkupNode>,
        planned: PlannedOperator<'a>,
    ) -> Result<SelectedOption> {
        let arguments = planned
            .arguments
            .into_iter()
            .map(|arg| self.commit_argument(cache, arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(SelectedOption {
            label: planned.info.name.clone(),
            output_type: planned.output_type,
            arguments,
        })
    }

    fn commit_argument(
        &self,
        cache: &mut Cache<MarkupNode>,
        arg: PlannedArgument,
    ) -> Result<CacheRef> {
        match arg {
            PlannedArgument::Input(input) => cache.insert(MarkupNode::Input(input)),
            PlannedArgument::Filter {
                label,
                filter,
                operand,
            } => {
                let by = cache.insert(MarkupNode::Input(MarkupInput {
                    label: FILTER_OPERAND_LABEL.to_string(),
                    kind: ArgumentKind::of_literal(&operand),
                    value: operand,
                }))?;
                let selected = cache.insert(MarkupNode::Option(SelectedOption {
                    label: filter.name().to_string(),
                    output_type: OutputType::Bytes.into(),
                    arguments: vec![by],
                }))?;
                cache.insert(MarkupNode::Select(MarkupSelect {
                    kind: SelectKind::Filter,
                    label: Some(label),
                    output_type: OutputType::Bytes.into(),
                    selected,
                    options: self.options.filters.clone(),
                }))
            }
            PlannedArgument::Reducer { label, reducer } => {
                let selected = cache.insert(MarkupNode::Option(SelectedOption {
                    label: reducer.name().to_string(),
                    output_type: OutputType::Bytes.into(),
                    arguments: Vec::new(),
                }))?;
                cache.insert(MarkupNode::Select(MarkupSelect {
                    kind: SelectKind::Reducer,
                    label: Some(label),
                    output_type: OutputType::Integer.into(),
                    selected,
                    options: self.options.reducers.clone(),
                }))
            }
        }
    }
}

fn plan_argument(
    code: OperatorCode,
    index: usize,
    spec: &ArgumentInfo,
    raw: &MirArgument,
) -> Result<PlannedArgument> {
    let malformed = |reason: String| Error::MalformedArgument {
        code,
        index,
        reason,
    };

    match spec.kind {
        ArgumentKind::Array
        | ArgumentKind::Boolean
        | ArgumentKind::Bytes
        | ArgumentKind::Float
        | ArgumentKind::Inner
        | ArgumentKind::Integer
        | ArgumentKind::Map
        | ArgumentKind::Mapper
        | ArgumentKind::Passthrough
        | ArgumentKind::Result
        | ArgumentKind::String => Ok(PlannedArgument::Input(MarkupInput {
            label: spec.name.clone(),
            kind: spec.kind,
            value: raw.clone(),
        })),
        ArgumentKind::Filter => {
            let (tag, operand) = match raw.as_array().map(Vec::as_slice) {
                Some([tag, operand]) => (tag, operand),
                _ => {
                    return Err(malformed(format!(
                        "filter `{}` must be a [function, operand] pair, got {raw}",
                        spec.name
                    )))
                }
            };
            let filter = tag
                .as_u64()
                .and_then(Filter::from_code)
                .ok_or_else(|| malformed(format!("unknown filter function {tag}")))?;
            Ok(PlannedArgument::Filter {
                label: spec.name.clone(),
                filter,
                operand: operand.clone(),
            })
        }
        ArgumentKind::Reducer => {
            let reducer = raw
                .as_u64()
                .and_then(Reducer::from_code)
                .ok_or_else(|| malformed(format!("unknown reducer function {raw}")))?;
            Ok(PlannedArgument::Reducer {
                label: spec.name.clone(),
                reducer,
            })
        }
    }
}
