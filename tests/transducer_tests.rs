//! Forward and reverse transducer tests against the built-in catalog.

use radon_core::catalog::Catalog;
use radon_core::error::Error;
use radon_core::id::{CacheRef, OperatorCode};
use radon_core::mir::MirScript;
use radon_core::types::{ArgumentKind, OutputType, ResolvedType};
use radon_markup::{
    expand, expand_select, lower_script, ArgumentOptions, Cache, ExpandedArgument, ExpandedNode,
    Generator, MarkupNode, SelectKind, FILTER_OPERAND_LABEL,
};
use serde_json::{json, Value};

fn generator() -> Generator<'static> {
    Generator::new(Catalog::standard(), ArgumentOptions::shared())
}

fn script(raw: Value) -> MirScript {
    serde_json::from_value(raw).unwrap()
}

fn price_script() -> MirScript {
    script(json!([
        0x45,
        0x74,
        [0x61, "bpi"],
        0x74,
        [0x61, "VSD"],
        0x74,
        [0x61, "rate_float"],
        0x72
    ]))
}

#[test]
fn test_price_script_yields_one_handle_per_operator() {
    let mut cache = Cache::new();
    let handles = generator()
        .script_to_tree(&mut cache, &price_script())
        .unwrap();
    assert_eq!(handles.len(), 8);

    let labels: Vec<String> = handles
        .iter()
        .map(|h| expand_select(&cache, *h).unwrap().selected.label)
        .collect();
    assert_eq!(
        labels,
        vec!["lessThan", "length", "get", "length", "get", "length", "get", "asFloat"]
    );

    // handles are minted in order and never collide
    for pair in handles.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    for h in &handles {
        let select = cache.resolve_select(*h).unwrap();
        assert!(cache.resolve_option(select.selected).is_ok());
    }
}

#[test]
fn test_get_arguments_survive_as_inputs() {
    let mut cache = Cache::new();
    let handles = generator()
        .script_to_tree(&mut cache, &price_script())
        .unwrap();
    let select = expand_select(&cache, handles[4]).unwrap();
    assert_eq!(select.kind, SelectKind::Operator { category: OutputType::Map });
    match select.selected.arguments.as_slice() {
        [ExpandedArgument::Input(input)] => {
            assert_eq!(input.label, "key");
            assert_eq!(input.kind, ArgumentKind::String);
            assert_eq!(input.value, json!("VSD"));
        }
        other => panic!("unexpected arguments {other:?}"),
    }
    assert!(select.output_type.is_polymorphic());
    assert!(select.output_type.contains(OutputType::Float));
}

#[test]
fn test_bare_operator_has_empty_arguments() {
    let mut cache = Cache::new();
    let handles = generator()
        .script_to_tree(&mut cache, &script(json!([0x74])))
        .unwrap();
    let select = expand_select(&cache, handles[0]).unwrap();
    assert!(select.selected.arguments.is_empty());
    assert_eq!(select.output_type, ResolvedType::One(OutputType::Integer));

    // always serialized as [], never omitted
    let json = serde_json::to_value(&select).unwrap();
    assert_eq!(json["selected"]["arguments"], json!([]));
}

#[test]
fn test_options_list_every_operator_of_the_input_category() {
    let mut cache = Cache::new();
    let handles = generator()
        .script_to_tree(&mut cache, &script(json!([0x74])))
        .unwrap();
    let select = cache.resolve_select(handles[0]).unwrap();
    let expected: Vec<&str> = Catalog::standard()
        .entries(OutputType::String)
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    let labels: Vec<&str> = select.options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, expected);
    assert!(labels.contains(&"length"));
}

#[test]
fn test_filter_argument_becomes_nested_select_with_by_input() {
    let mut cache = Cache::new();
    let handles = generator()
        .script_to_tree(&mut cache, &script(json!([[0x11, [0x05, 1.5]]])))
        .unwrap();
    let select = expand_select(&cache, handles[0]).unwrap();
    assert_eq!(select.selected.label, "filter");

    let nested = match select.selected.arguments.as_slice() {
        [ExpandedArgument::Select(nested)] => nested,
        other => panic!("unexpected arguments {other:?}"),
    };
    assert_eq!(nested.kind, SelectKind::Filter);
    assert_eq!(nested.label.as_deref(), Some("function"));
    assert_eq!(nested.options.len(), 16);
    assert_eq!(nested.selected.label, "deviationStandard");
    assert_eq!(nested.selected.output_type, ResolvedType::One(OutputType::Bytes));
    match nested.selected.arguments.as_slice() {
        [ExpandedArgument::Input(by)] => {
            assert_eq!(by.label, FILTER_OPERAND_LABEL);
            assert_eq!(by.value, json!(1.5));
            assert_eq!(by.kind, ArgumentKind::Float);
        }
        other => panic!("unexpected filter arguments {other:?}"),
    }
}

#[test]
fn test_reducer_argument_has_no_arguments_and_bytes_option() {
    let mut cache = Cache::new();
    let handles = generator()
        .script_to_tree(&mut cache, &script(json!([[0x1b, 0x03]])))
        .unwrap();
    let select = expand_select(&cache, handles[0]).unwrap();
    let nested = match select.selected.arguments.as_slice() {
        [ExpandedArgument::Select(nested)] => nested,
        other => panic!("unexpected arguments {other:?}"),
    };
    assert_eq!(nested.kind, SelectKind::Reducer);
    assert_eq!(nested.output_type, ResolvedType::One(OutputType::Integer));
    assert_eq!(nested.selected.label, "averageMean");
    assert_eq!(nested.selected.output_type, ResolvedType::One(OutputType::Bytes));
    assert!(nested.selected.arguments.is_empty());
    assert_eq!(nested.options.len(), 11);
}

#[test]
fn test_unknown_operator_inserts_nothing() {
    let mut cache = Cache::new();
    generator()
        .script_to_tree(&mut cache, &script(json!([0x74])))
        .unwrap();
    let before = cache.len();

    // valid operators ahead of the bad one must not leak into the arena
    let err = generator()
        .script_to_tree(&mut cache, &script(json!([[0x61, "bpi"], 0x74, 0xff])))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownOperator(code) if code == OperatorCode::new(0xff)));
    assert_eq!(cache.len(), before);
}

#[test]
fn test_codes_beyond_one_byte_are_unknown_operators() {
    let mut cache = Cache::new();
    for raw in [json!([256]), json!([[256, "x"]]), json!([0x74, 70000])] {
        let err = generator()
            .script_to_tree(&mut cache, &script(raw))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownOperator(_)));
    }
    let err = generator()
        .script_to_tree(&mut cache, &script(json!([[256, "x"]])))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownOperator(code) if code == OperatorCode::new(256)));
    assert!(cache.is_empty());
}

#[test]
fn test_empty_call_is_malformed() {
    let mut cache = Cache::new();
    let err = generator()
        .script_to_tree(&mut cache, &script(json!([0x74, []])))
        .unwrap_err();
    assert!(matches!(err, Error::MalformedOperator(_)));
    assert!(cache.is_empty());
}

#[test]
fn test_expand_propagates_dangling_handles() {
    let mut cache = Cache::new();
    generator()
        .script_to_tree(&mut cache, &script(json!([0x74])))
        .unwrap();
    let err = expand(&cache, CacheRef::new(1000)).unwrap_err();
    assert!(matches!(err, Error::DanglingHandle(h) if h.id == 1000));
}

#[test]
fn test_expand_works_on_any_node_kind() {
    let mut cache = Cache::new();
    let handles = generator()
        .script_to_tree(&mut cache, &script(json!([[0x61, "bpi"]])))
        .unwrap();
    // input (1), option (2), select (3)
    assert_eq!(handles, vec![CacheRef::new(3)]);
    assert!(matches!(expand(&cache, CacheRef::new(1)).unwrap(), ExpandedNode::Input(_)));
    assert!(matches!(expand(&cache, CacheRef::new(2)).unwrap(), ExpandedNode::Option(_)));
    assert!(matches!(expand(&cache, CacheRef::new(3)).unwrap(), ExpandedNode::Select(_)));
    assert!(matches!(cache.resolve(CacheRef::new(1)).unwrap(), MarkupNode::Input(_)));
}

#[test]
fn test_lowering_restores_the_compact_script() {
    let scripts = [
        price_script(),
        script(json!([[0x11, [0x05, 1.5]], [0x1b, 0x03]])),
        script(json!([0x76, [0x61, "data"], [0x14, 0]])),
        script(json!([[0x11, [0x80, "x"]], [0x1b, 0x0a], 0x10])),
        Vec::new(),
    ];
    for s in scripts {
        let mut cache = Cache::with_origin(40);
        let handles = generator().script_to_tree(&mut cache, &s).unwrap();
        let lowered = lower_script(Catalog::standard(), &cache, &handles).unwrap();
        assert_eq!(lowered, s);
    }
}
