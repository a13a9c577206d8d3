//! Edit entry points: every edit inserts fresh nodes and repoints the script.

use radon_core::catalog::Catalog;
use radon_core::error::Error;
use radon_core::id::OperatorCode;
use radon_core::mir::{Mir, MirOperator, MirScript};
use radon_markup::{parse_mir, RadonMarkup, Stage};
use serde_json::{json, Value};

const DOC: &str = r#"
name: edits
radRequest:
  retrieve:
    - url: "https://example.com/price"
      script: [0x76, [0x61, "bpi"], [0x61, "USD"]]
  aggregate: []
  tally: [[0x1b, 0x03]]
"#;

fn load(mir: &Mir) -> RadonMarkup<'static> {
    RadonMarkup::new(Catalog::standard(), Some(mir)).unwrap()
}

fn script(raw: Value) -> MirScript {
    serde_json::from_value(raw).unwrap()
}

#[test]
fn test_select_operator_replaces_and_keeps_old_nodes() {
    let mir = parse_mir(DOC).unwrap();
    let mut markup = load(&mir);
    let old = markup.script(Stage::Retrieve(0)).unwrap()[1];

    let fresh = markup
        .select_operator(Stage::Retrieve(0), 1, "values")
        .unwrap();
    assert_ne!(old, fresh);
    assert_eq!(markup.script(Stage::Retrieve(0)).unwrap()[1], fresh);
    assert!(markup.cache().contains(old));

    let lowered = markup.mir().unwrap();
    assert_eq!(
        lowered.rad_request.retrieve[0].script,
        script(json!([0x76, 0x63, [0x61, "USD"]]))
    );
}

#[test]
fn test_select_operator_seeds_required_arguments() {
    let mir = parse_mir(DOC).unwrap();
    let mut markup = load(&mir);
    markup.select_operator(Stage::Retrieve(0), 1, "keys").unwrap();
    markup.select_operator(Stage::Retrieve(0), 1, "get").unwrap();
    let lowered = markup.lower(markup.script(Stage::Retrieve(0)).unwrap()).unwrap();
    assert_eq!(lowered[1], MirOperator::Call(vec![json!(0x61), json!("")]));
}

#[test]
fn test_select_unknown_label_changes_nothing() {
    let mir = parse_mir(DOC).unwrap();
    let mut markup = load(&mir);
    let before = markup.cache().len();
    let err = markup
        .select_operator(Stage::Retrieve(0), 1, "nonsense")
        .unwrap_err();
    assert!(matches!(err, Error::UnknownOption { .. }));
    assert_eq!(markup.cache().len(), before);
    assert_eq!(markup.mir().unwrap(), mir);
}

#[test]
fn test_update_argument_sets_literal_values() {
    let mir = parse_mir(DOC).unwrap();
    let mut markup = load(&mir);
    markup
        .update_argument(Stage::Retrieve(0), 2, 0, json!("EUR"))
        .unwrap();
    let lowered = markup.mir().unwrap();
    assert_eq!(
        lowered.rad_request.retrieve[0].script[2],
        MirOperator::Call(vec![json!(0x61), json!("EUR")])
    );

    let err = markup
        .update_argument(Stage::Retrieve(0), 2, 1, json!("extra"))
        .unwrap_err();
    assert!(matches!(err, Error::OutOfRange(_)));
}

#[test]
fn test_update_argument_switches_reducer() {
    let mir = parse_mir(DOC).unwrap();
    let mut markup = load(&mir);
    markup.update_argument(Stage::Tally, 0, 0, json!(0x00)).unwrap();
    let tally = markup.markup().unwrap().rad_request.tally;
    let json = serde_json::to_value(&tally[0]).unwrap();
    assert_eq!(json["selected"]["arguments"][0]["selected"]["label"], json!("min"));

    let err = markup.update_argument(Stage::Tally, 0, 0, json!(0x7f)).unwrap_err();
    assert!(matches!(err, Error::MalformedArgument { .. }));
}

#[test]
fn test_push_and_remove_operators() {
    let mir = parse_mir(DOC).unwrap();
    let mut markup = load(&mir);
    markup
        .push_operator(Stage::Aggregate, &MirOperator::Bare(OperatorCode::new(0x10)))
        .unwrap();
    markup
        .push_operator(Stage::Aggregate, &script(json!([[0x1b, 0x02]]))[0])
        .unwrap();
    assert_eq!(markup.script(Stage::Aggregate).unwrap().len(), 2);

    let removed = markup.remove_operator(Stage::Aggregate, 0).unwrap();
    assert!(markup.cache().contains(removed));
    assert_eq!(
        markup.mir().unwrap().rad_request.aggregate,
        script(json!([[0x1b, 0x02]]))
    );

    let err = markup.remove_operator(Stage::Aggregate, 5).unwrap_err();
    assert!(matches!(err, Error::OutOfRange(_)));
}

#[test]
fn test_source_edits() {
    let mut markup = RadonMarkup::new(Catalog::standard(), None).unwrap();
    markup.set_name("feeds");
    markup.set_source_url(0, "https://a.example").unwrap();
    let idx = markup.add_source("https://b.example");
    assert_eq!(idx, 1);
    markup
        .push_operator(Stage::Retrieve(1), &MirOperator::Bare(OperatorCode::new(0x76)))
        .unwrap();

    let mir = markup.mir().unwrap();
    assert_eq!(mir.name, "feeds");
    assert_eq!(mir.rad_request.retrieve[0].url, "https://a.example");
    assert_eq!(mir.rad_request.retrieve[1].script.len(), 1);

    let removed = markup.remove_source(0).unwrap();
    assert_eq!(removed.url, "https://a.example");
    assert!(matches!(
        markup.set_source_url(3, "x").unwrap_err(),
        Error::OutOfRange(_)
    ));
}

#[test]
fn test_edits_change_the_snapshot_hash() {
    let mir = parse_mir(DOC).unwrap();
    let mut markup = load(&mir);
    let before = markup.snapshot_hash().unwrap();
    markup
        .update_argument(Stage::Retrieve(0), 1, 0, json!("bpi"))
        .unwrap();
    // same value, same view
    assert_eq!(markup.snapshot_hash().unwrap(), before);
    markup
        .update_argument(Stage::Retrieve(0), 1, 0, json!("time"))
        .unwrap();
    assert_ne!(markup.snapshot_hash().unwrap(), before);
}
