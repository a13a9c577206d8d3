//! Catalog invariants and custom catalogs driving conversion.

use radon_core::catalog::Catalog;
use radon_core::config::MarkupConfig;
use radon_core::error::Error;
use radon_core::id::OperatorCode;
use radon_core::mir::MirScript;
use radon_core::types::{OutputType, ResolvedType};
use radon_markup::{
    catalog_to_yaml, parse_catalog, parse_mir, ArgumentOptions, Cache, Generator, RadonMarkup,
};
use serde_json::json;

const TINY_CATALOG: &str = r#"
operators:
  - code: 1
    name: size
    category: map
    output: [integer]
  - code: 2
    name: get
    category: map
    output: [string, integer]
    arguments:
      - { name: key, kind: string }
  - code: 3
    name: length
    category: string
    output: [integer]
"#;

#[test]
fn test_every_known_code_resolves_to_a_nonempty_type() {
    let catalog = Catalog::standard();
    for def in catalog.defs() {
        let resolved = catalog.output_type_of(def.code).unwrap();
        assert!(!resolved.members().is_empty());
        assert_eq!(resolved.is_polymorphic(), def.output.len() > 1);
        assert_eq!(catalog.operator_info(def.code).unwrap().category, def.category);
    }
}

#[test]
fn test_unknown_code_is_reported() {
    let err = Catalog::standard()
        .output_type_of(OperatorCode::new(0xff))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownOperator(c) if c.get() == 0xff));
    assert!(Catalog::standard().operator_info(OperatorCode::new(0x00)).is_err());
}

#[test]
fn test_custom_catalog_drives_conversion() {
    let catalog = parse_catalog(TINY_CATALOG).unwrap();
    assert_eq!(catalog.len(), 3);
    let generator = Generator::new(&catalog, ArgumentOptions::shared());

    let mut cache = Cache::new();
    let script: MirScript = serde_json::from_value(json!([1, [2, "k"]])).unwrap();
    let handles = generator.script_to_tree(&mut cache, &script).unwrap();
    let get = cache.resolve_select(handles[1]).unwrap();
    assert_eq!(
        get.output_type,
        ResolvedType::Polymorphic(vec![OutputType::String, OutputType::Integer])
    );
    let labels: Vec<&str> = get.options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["size", "get"]);

    // codes from the built-in table mean nothing here
    let script: MirScript = serde_json::from_value(json!([0x74])).unwrap();
    let err = generator.script_to_tree(&mut cache, &script).unwrap_err();
    assert!(matches!(err, Error::UnknownOperator(_)));
}

#[test]
fn test_catalog_file_replaces_builtin_table() {
    let path = std::env::temp_dir().join(format!("radon-catalog-{}.yaml", std::process::id()));
    std::fs::write(&path, TINY_CATALOG).unwrap();
    let config = MarkupConfig {
        catalog_path: Some(path.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let catalog = config.load_catalog().unwrap();
    std::fs::remove_file(&path).unwrap();

    let mir = parse_mir(
        r#"
radRequest:
  retrieve:
    - url: "x"
      script: [3]
"#,
    )
    .unwrap();
    let markup = RadonMarkup::with_config(&catalog, Some(&mir), &config).unwrap();
    assert_eq!(markup.mir().unwrap(), mir);
}

#[test]
fn test_conflicting_catalog_is_rejected() {
    let src = r#"
operators:
  - { code: 5, name: count, category: array, output: [integer] }
  - { code: 6, name: count, category: array, output: [integer] }
"#;
    assert!(parse_catalog(src).is_err());
}

#[test]
fn test_builtin_catalog_dumps_and_reloads() {
    let yaml = catalog_to_yaml(Catalog::standard()).unwrap();
    assert!(yaml.contains("parseJson"));
    let back = parse_catalog(&yaml).unwrap();
    assert_eq!(back.len(), Catalog::standard().len());
    for category in OutputType::ALL {
        assert_eq!(back.entries(*category), Catalog::standard().entries(*category));
    }
}
