//! Type tags shared by the catalog and the markup tree.
//!
//! `OutputType` doubles as the input category an operator belongs to.
//! `Filter` and `Reducer` are the closed enumerations offered for filter and
//! reducer argument slots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputType {
    Array,
    Boolean,
    Bytes,
    Float,
    /// Not resolvable from the catalog alone (depends on runtime data).
    Generic,
    Integer,
    Map,
    Result,
    String,
}

impl OutputType {
    pub const ALL: &'static [OutputType] = &[
        OutputType::Array,
        OutputType::Boolean,
        OutputType::Bytes,
        OutputType::Float,
        OutputType::Generic,
        OutputType::Integer,
        OutputType::Map,
        OutputType::Result,
        OutputType::String,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            OutputType::Array => "array",
            OutputType::Boolean => "boolean",
            OutputType::Bytes => "bytes",
            OutputType::Float => "float",
            OutputType::Generic => "generic",
            OutputType::Integer => "integer",
            OutputType::Map => "map",
            OutputType::Result => "result",
            OutputType::String => "string",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Parse(format!("unknown output type `{s}`")))
    }
}

/// Output type of an operator call: a single type, or the set of types a
/// polymorphic operator may produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedType {
    One(OutputType),
    Polymorphic(Vec<OutputType>),
}

impl ResolvedType {
    /// Collapse a declared output list: one member stays scalar, more than
    /// one becomes a set. Callers never pass an empty list.
    pub fn from_declared(types: &[OutputType]) -> Option<Self> {
        match types {
            [] => None,
            [single] => Some(ResolvedType::One(*single)),
            many => Some(ResolvedType::Polymorphic(many.to_vec())),
        }
    }

    pub fn contains(&self, t: OutputType) -> bool {
        match self {
            ResolvedType::One(one) => *one == t,
            ResolvedType::Polymorphic(set) => set.contains(&t),
        }
    }

    pub fn is_polymorphic(&self) -> bool {
        matches!(self, ResolvedType::Polymorphic(_))
    }

    /// Every member, in declared order.
    pub fn members(&self) -> Vec<OutputType> {
        match self {
            ResolvedType::One(one) => vec![*one],
            ResolvedType::Polymorphic(set) => set.clone(),
        }
    }
}

impl From<OutputType> for ResolvedType {
    fn from(t: OutputType) -> Self {
        ResolvedType::One(t)
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::One(t) => write!(f, "{t}"),
            ResolvedType::Polymorphic(set) => {
                let names: Vec<&str> = set.iter().map(|t| t.name()).collect();
                write!(f, "{}", names.join("|"))
            }
        }
    }
}

/// Declared kind of an operator argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArgumentKind {
    Array,
    Boolean,
    Bytes,
    Filter,
    Float,
    Inner,
    Integer,
    Map,
    Mapper,
    Passthrough,
    Reducer,
    Result,
    String,
}

impl ArgumentKind {
    /// Best-effort kind of a bare literal.
    pub fn of_literal(value: &Value) -> Self {
        match value {
            Value::Null => ArgumentKind::Passthrough,
            Value::Bool(_) => ArgumentKind::Boolean,
            Value::Number(n) if n.is_f64() => ArgumentKind::Float,
            Value::Number(_) => ArgumentKind::Integer,
            Value::String(_) => ArgumentKind::String,
            Value::Array(_) => ArgumentKind::Array,
            Value::Object(_) => ArgumentKind::Map,
        }
    }

    /// Raw compact value used to seed a freshly selected operator.
    pub fn default_value(self) -> Value {
        match self {
            ArgumentKind::Boolean => Value::Bool(false),
            ArgumentKind::Float => serde_json::json!(0.0),
            ArgumentKind::Integer => serde_json::json!(0),
            ArgumentKind::String => Value::String(String::new()),
            ArgumentKind::Array | ArgumentKind::Bytes | ArgumentKind::Mapper => {
                Value::Array(Vec::new())
            }
            ArgumentKind::Map => Value::Object(serde_json::Map::new()),
            ArgumentKind::Filter => serde_json::json!([Filter::GreaterThan.code(), 0]),
            ArgumentKind::Reducer => serde_json::json!(Reducer::Min.code()),
            ArgumentKind::Inner | ArgumentKind::Passthrough | ArgumentKind::Result => Value::Null,
        }
    }
}

macro_rules! tag_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $code:literal => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Stable display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_code(code: u64) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| u64::from(v.code()) == code)
            }

            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.name() == name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

tag_enum!(
    /// Filter functions accepted by filter-kind arguments.
    Filter {
        GreaterThan = 0x00 => "greaterThan",
        LessThan = 0x01 => "lessThan",
        Equals = 0x02 => "equals",
        DeviationAbsolute = 0x03 => "deviationAbsolute",
        DeviationRelative = 0x04 => "deviationRelative",
        DeviationStandard = 0x05 => "deviationStandard",
        Top = 0x06 => "top",
        Bottom = 0x07 => "bottom",
        LessOrEqualThan = 0x80 => "lessOrEqualThan",
        GreaterOrEqualThan = 0x81 => "greaterOrEqualThan",
        NotEquals = 0x82 => "notEquals",
        NotDeviationAbsolute = 0x83 => "notDeviationAbsolute",
        NotDeviationRelative = 0x84 => "notDeviationRelative",
        NotDeviationStandard = 0x85 => "notDeviationStandard",
        NotTop = 0x86 => "notTop",
        NotBottom = 0x87 => "notBottom",
    }
);

tag_enum!(
    /// Reducer functions accepted by reducer-kind arguments.
    Reducer {
        Min = 0x00 => "min",
        Max = 0x01 => "max",
        Mode = 0x02 => "mode",
        AverageMean = 0x03 => "averageMean",
        AverageMeanWeighted = 0x04 => "averageMeanWeighted",
        AverageMedian = 0x05 => "averageMedian",
        AverageMedianWeighted = 0x06 => "averageMedianWeighted",
        DeviationStandard = 0x07 => "deviationStandard",
        DeviationAverage = 0x08 => "deviationAverage",
        DeviationMedian = 0x09 => "deviationMedian",
        DeviationMaximum = 0x0a => "deviationMaximum",
    }
);
