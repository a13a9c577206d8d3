//! Compact form of a Radon request ("MIR").
//!
//! A script is an ordered list of operators. An operator is either a bare
//! code (zero arguments) or a sequence whose head is the code and whose tail
//! holds the raw arguments, positionally matched to the catalog's argument
//! specs. Raw arguments stay as `serde_json::Value`; their meaning depends on
//! the declared argument kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::OperatorCode;

pub type MirArgument = Value;
pub type MirScript = Vec<MirOperator>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MirOperator {
    Bare(OperatorCode),
    Call(Vec<Value>),
}

impl MirOperator {
    /// Build a call from a code and its raw arguments. No arguments yields a
    /// bare code.
    pub fn call(code: OperatorCode, args: Vec<MirArgument>) -> Self {
        if args.is_empty() {
            return MirOperator::Bare(code);
        }
        let mut items = Vec::with_capacity(args.len() + 1);
        items.push(Value::from(code.get()));
        items.extend(args);
        MirOperator::Call(items)
    }
}

impl MirOperator {
    /// Canonical spelling: a call without arguments becomes a bare code.
    pub fn normalized(self) -> Self {
        if let MirOperator::Call(items) = &self {
            if let [head] = items.as_slice() {
                if let Some(code) = head.as_u64() {
                    return MirOperator::Bare(OperatorCode::new(code));
                }
            }
        }
        self
    }
}

impl From<OperatorCode> for MirOperator {
    fn from(code: OperatorCode) -> Self {
        MirOperator::Bare(code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirSource {
    pub url: String,
    #[serde(default)]
    pub script: MirScript,
}

impl MirSource {
    pub fn new(url: impl Into<String>, script: MirScript) -> Self {
        Self {
            url: url.into(),
            script,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirRequest {
    #[serde(default)]
    pub not_before: u64,
    pub retrieve: Vec<MirSource>,
    #[serde(default)]
    pub aggregate: MirScript,
    #[serde(default)]
    pub tally: MirScript,
}

impl Default for MirRequest {
    /// One placeholder source with an empty url and script.
    fn default() -> Self {
        Self {
            not_before: 0,
            retrieve: vec![MirSource::new("", Vec::new())],
            aggregate: Vec::new(),
            tally: Vec::new(),
        }
    }
}

/// Whole compact document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mir {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rad_request: MirRequest,
}

impl Mir {
    /// The document with every script in canonical spelling. Lowering a
    /// converted document yields exactly this.
    pub fn normalized(mut self) -> Self {
        let request = &mut self.rad_request;
        for source in &mut request.retrieve {
            normalize_script(&mut source.script);
        }
        normalize_script(&mut request.aggregate);
        normalize_script(&mut request.tally);
        self
    }
}

fn normalize_script(script: &mut MirScript) {
    let ops = std::mem::take(script);
    *script = ops.into_iter().map(MirOperator::normalized).collect();
}
