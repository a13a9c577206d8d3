//! Operator catalog: per-code metadata plus the type-indexed table.
//!
//! The catalog is built from a flat list of `OperatorDef`s. Construction
//! checks that every code lives in exactly one input category, so lookups by
//! code are unambiguous afterwards.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::OperatorCode;
use crate::types::{ArgumentKind, OutputType, ResolvedType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentInfo {
    pub name: String,
    pub kind: ArgumentKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// One catalog row, as written in catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDef {
    pub code: OperatorCode,
    pub name: String,
    /// Input category the operator is legal for.
    pub category: OutputType,
    pub output: Vec<OutputType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentInfo>,
}

/// Metadata returned for a code: display name and ordered argument specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorInfo {
    pub code: OperatorCode,
    pub name: String,
    pub category: OutputType,
    pub arguments: Vec<ArgumentInfo>,
}

/// Row of the type-indexed table: name → (code, possible outputs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSystemEntry {
    pub name: String,
    pub code: OperatorCode,
    pub output: ResolvedType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogDoc {
    operators: Vec<OperatorDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CatalogDoc", into = "CatalogDoc")]
pub struct Catalog {
    defs: Vec<OperatorDef>,
    infos: BTreeMap<OperatorCode, OperatorInfo>,
    type_system: BTreeMap<OutputType, Vec<TypeSystemEntry>>,
    // code → resolved output, filled once at construction
    output_index: BTreeMap<OperatorCode, ResolvedType>,
}

static STANDARD: Lazy<Catalog> = Lazy::new(|| {
    // Static table; covered by `standard_catalog_is_consistent`.
    Catalog::new(standard_defs()).expect("built-in operator catalog is consistent")
});

impl Catalog {
    pub fn new(defs: Vec<OperatorDef>) -> Result<Self> {
        let mut infos: BTreeMap<OperatorCode, OperatorInfo> = BTreeMap::new();
        let mut type_system: BTreeMap<OutputType, Vec<TypeSystemEntry>> = BTreeMap::new();
        let mut output_index = BTreeMap::new();

        for def in &defs {
            let output = ResolvedType::from_declared(&def.output).ok_or_else(|| {
                Error::Catalog(format!("operator {} `{}` declares no output type", def.code, def.name))
            })?;
            if let Some(prev) = infos.get(&def.code) {
                return Err(Error::Catalog(format!(
                    "operator {} appears in categories {} and {}",
                    def.code, prev.category, def.category
                )));
            }
            let entries = type_system.entry(def.category).or_default();
            if entries.iter().any(|e| e.name == def.name) {
                return Err(Error::Catalog(format!(
                    "operator name `{}` appears twice in category {}",
                    def.name, def.category
                )));
            }
            entries.push(TypeSystemEntry {
                name: def.name.clone(),
                code: def.code,
                output: output.clone(),
            });
            infos.insert(
                def.code,
                OperatorInfo {
                    code: def.code,
                    name: def.name.clone(),
                    category: def.category,
                    arguments: def.arguments.clone(),
                },
            );
            output_index.insert(def.code, output);
        }

        Ok(Self {
            defs,
            infos,
            type_system,
            output_index,
        })
    }

    /// The built-in catalog, constructed on first use and shared read-only.
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    pub fn operator_info(&self, code: OperatorCode) -> Result<&OperatorInfo> {
        self.infos.get(&code).ok_or(Error::UnknownOperator(code))
    }

    /// Output type of `code`: one type, or the full set for polymorphic
    /// operators.
    pub fn output_type_of(&self, code: OperatorCode) -> Result<ResolvedType> {
        self.output_index
            .get(&code)
            .cloned()
            .ok_or(Error::UnknownOperator(code))
    }

    /// Operators legal for an input category, in declaration order.
    pub fn entries(&self, category: OutputType) -> &[TypeSystemEntry] {
        self.type_system
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn code_for(&self, category: OutputType, name: &str) -> Option<OperatorCode> {
        self.entries(category)
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.code)
    }

    pub fn categories(&self) -> impl Iterator<Item = OutputType> + '_ {
        self.type_system.keys().copied()
    }

    pub fn defs(&self) -> &[OperatorDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl TryFrom<CatalogDoc> for Catalog {
    type Error = Error;

    fn try_from(doc: CatalogDoc) -> Result<Self> {
        Catalog::new(doc.operators)
    }
}

impl From<Catalog> for CatalogDoc {
    fn from(c: Catalog) -> Self {
        CatalogDoc {
            operators: c.defs,
        }
    }
}

fn op(
    code: u8,
    category: OutputType,
    name: &str,
    output: &[OutputType],
    arguments: &[(&str, ArgumentKind, bool)],
) -> OperatorDef {
    OperatorDef {
        code: OperatorCode::new(u64::from(code)),
        name: name.to_string(),
        category,
        output: output.to_vec(),
        arguments: arguments
            .iter()
            .map(|(name, kind, optional)| ArgumentInfo {
                name: name.to_string(),
                kind: *kind,
                optional: *optional,
            })
            .collect(),
    }
}

/// Rows of the built-in catalog. The high nibble of a code names its
/// category.
pub fn standard_defs() -> Vec<OperatorDef> {
    use ArgumentKind as K;
    use OutputType::*;

    vec![
        op(0x10, Array, "count", &[Integer], &[]),
        op(0x11, Array, "filter", &[Array], &[("function", K::Filter, false)]),
        op(0x12, Array, "flatten", &[Array], &[("depth", K::Integer, true)]),
        op(0x13, Array, "getArray", &[Array], &[("index", K::Integer, false)]),
        op(0x14, Array, "getBoolean", &[Boolean], &[("index", K::Integer, false)]),
        op(0x15, Array, "getBytes", &[Bytes], &[("index", K::Integer, false)]),
        op(0x16, Array, "getFloat", &[Float], &[("index", K::Integer, false)]),
        op(0x17, Array, "getInteger", &[Integer], &[("index", K::Integer, false)]),
        op(0x18, Array, "getMap", &[Map], &[("index", K::Integer, false)]),
        op(0x19, Array, "getString", &[String], &[("index", K::Integer, false)]),
        op(0x1a, Array, "map", &[Array], &[("script", K::Mapper, false)]),
        op(0x1b, Array, "reduce", &[Generic], &[("function", K::Reducer, false)]),
        op(0x1c, Array, "some", &[Boolean], &[("function", K::Filter, false)]),
        op(
            0x1d,
            Array,
            "sort",
            &[Array],
            &[("mapFunction", K::Mapper, false), ("ascending", K::Boolean, false)],
        ),
        op(
            0x1e,
            Array,
            "take",
            &[Array],
            &[("min", K::Integer, false), ("max", K::Integer, true)],
        ),
        op(0x20, Boolean, "asString", &[String], &[]),
        op(
            0x21,
            Boolean,
            "match",
            &[Generic],
            &[("categories", K::Map, false), ("default", K::Inner, false)],
        ),
        op(0x22, Boolean, "negate", &[Boolean], &[]),
        op(0x30, Bytes, "asString", &[String], &[]),
        op(0x31, Bytes, "hash", &[Bytes], &[("function", K::Integer, false)]),
        op(0x40, Integer, "absolute", &[Integer], &[]),
        op(0x41, Integer, "asBytes", &[Bytes], &[]),
        op(0x42, Integer, "asFloat", &[Float], &[]),
        op(0x43, Integer, "asString", &[String], &[("base", K::Integer, true)]),
        op(0x44, Integer, "greaterThan", &[Boolean], &[("value", K::Integer, false)]),
        op(0x45, Integer, "lessThan", &[Boolean], &[("value", K::Integer, false)]),
        op(
            0x46,
            Integer,
            "match",
            &[Generic],
            &[("categories", K::Map, false), ("default", K::Inner, false)],
        ),
        op(0x47, Integer, "modulo", &[Integer], &[("modulus", K::Integer, false)]),
        op(0x48, Integer, "multiply", &[Integer], &[("factor", K::Integer, false)]),
        op(0x49, Integer, "negate", &[Integer], &[]),
        op(0x4a, Integer, "power", &[Integer], &[("exponent", K::Integer, false)]),
        op(0x4b, Integer, "reciprocal", &[Float], &[]),
        op(0x4c, Integer, "sum", &[Integer], &[("addend", K::Integer, false)]),
        op(0x50, Float, "absolute", &[Float], &[]),
        op(0x51, Float, "asBytes", &[Bytes], &[]),
        op(0x52, Float, "asString", &[String], &[("decimals", K::Integer, true)]),
        op(0x53, Float, "ceiling", &[Integer], &[]),
        op(0x54, Float, "greaterThan", &[Boolean], &[("value", K::Float, false)]),
        op(0x55, Float, "floor", &[Integer], &[]),
        op(0x56, Float, "lessThan", &[Boolean], &[("value", K::Float, false)]),
        op(0x57, Float, "modulo", &[Float], &[("modulus", K::Float, false)]),
        op(0x58, Float, "multiply", &[Float], &[("factor", K::Float, false)]),
        op(0x59, Float, "negate", &[Float], &[]),
        op(0x5a, Float, "power", &[Float], &[("exponent", K::Float, false)]),
        op(0x5b, Float, "reciprocal", &[Float], &[]),
        op(0x5c, Float, "round", &[Integer], &[]),
        op(0x5d, Float, "sum", &[Float], &[("addend", K::Float, false)]),
        op(0x5e, Float, "truncate", &[Integer], &[]),
        op(0x60, Map, "entries", &[Array], &[]),
        op(
            0x61,
            Map,
            "get",
            &[Array, Boolean, Bytes, Float, Integer, Map, String],
            &[("key", K::String, false)],
        ),
        op(0x62, Map, "keys", &[Array], &[]),
        op(0x63, Map, "values", &[Array], &[]),
        op(0x70, String, "asBoolean", &[Boolean], &[]),
        op(0x71, String, "asBytes", &[Bytes], &[]),
        op(0x72, String, "asFloat", &[Float], &[]),
        op(0x73, String, "asInteger", &[Integer], &[]),
        op(0x74, String, "length", &[Integer], &[]),
        op(
            0x75,
            String,
            "match",
            &[Generic],
            &[("categories", K::Map, false), ("default", K::Inner, false)],
        ),
        op(0x76, String, "parseJson", &[Map, Array], &[]),
        op(0x77, String, "parseXml", &[Map], &[]),
        op(0x78, String, "toLowerCase", &[String], &[]),
        op(0x79, String, "toUpperCase", &[String], &[]),
        op(0x80, Result, "get", &[Generic], &[]),
        op(0x81, Result, "getOr", &[Generic], &[("default", K::Passthrough, false)]),
        op(0x82, Result, "isOk", &[Boolean], &[]),
        op(0x83, Result, "isErr", &[Boolean], &[]),
        op(0x84, Result, "map", &[Result], &[("script", K::Result, false)]),
    ]
}
