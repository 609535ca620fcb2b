//! Import scenario tests

use gvm::error::{ErrorKind, GvmError};
use gvm::ImportPolicy;

use crate::harness::GvmTest;

#[test]
fn test_import_summary() {
    let mut test = GvmTest::new();
    let summary = test.gvm.import_json(crate::harness::CHARACTER).unwrap();
    assert!(summary.is_clean());
    assert_eq!(summary.values().count(), 15);

    let effects: Vec<&str> = summary.effects().collect();
    assert_eq!(effects, vec!["bless", "shield", "resistance", "crit"]);

    // Embedded effect registered though not listed as a top-level entry
    assert!(test.gvm.effect("flaming").is_ok());
}

#[test]
fn test_calc_seeded_on_import() {
    let test = GvmTest::character();
    assert_eq!(test.base("AMOD_STR", Some("P1")), 3.0);
    assert_eq!(test.base("AMOD_DEX", Some("P1")), 2.0);
    assert_eq!(test.base("AC", Some("P1")), 12.0);
    assert_eq!(test.base("DMG", Some("P1")), 9.0);

    let d20 = test.base("D20", None);
    assert!((1.0..=20.0).contains(&d20));
}

#[test]
fn test_missing_input_names_entry() {
    let mut test = GvmTest::new();
    let doc = r#"{
        "static": [{"baseVal": 3, "name": "DEX", "owner": "P1"}],
        "calc": [
            {"name": "INIT", "owner": "P1", "operation": "+", "values": ["DEX"]},
            {"name": "ATK", "owner": "P1", "operation": "+", "values": ["D20", "DEX"]},
            {"name": "LATE", "owner": "P1", "operation": "+", "values": ["DEX"]}
        ]
    }"#;

    let err = test.gvm.import_json(doc).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    match err {
        GvmError::Import {
            category,
            index,
            source,
            ..
        } => {
            assert_eq!(category, "calc");
            assert_eq!(index, 1);
            assert!(source.to_string().contains("D20"));
        }
        other => panic!("unexpected error {:?}", other),
    }

    // Earlier entries stay, later ones were never reached
    assert!(test.gvm.get_id_by_name("INIT", Some("P1")).is_ok());
    assert!(test.gvm.get_id_by_name("LATE", Some("P1")).is_err());
}

#[test]
fn test_skip_invalid_collects_failures() {
    let mut test = GvmTest::new();
    test.gvm.set_import_policy(ImportPolicy::SkipInvalid);
    let doc = r#"{
        "static": [
            {"baseVal": 1, "name": "A"},
            {"baseVal": 2, "name": "A"},
            {"baseVal": 3, "name": "public"},
            {"baseVal": 4, "name": "has space"}
        ],
        "effect": [
            {"name": "e", "values": {}, "operation": "1", "targetTags": []},
            {"name": "e", "values": {}, "operation": "2", "targetTags": []}
        ]
    }"#;

    let summary = test.gvm.import_json(doc).unwrap();
    assert_eq!(summary.values().count(), 1);
    assert_eq!(summary.effects().count(), 1);

    let kinds: Vec<ErrorKind> = summary.failures.iter().map(|f| f.error.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::Conflict,
            ErrorKind::Conflict,
            ErrorKind::Invalid,
            ErrorKind::Conflict
        ]
    );
    assert_eq!(summary.failures[3].category, "effect");
    assert_eq!(test.base("A", None), 1.0);
}

#[test]
fn test_config_policy_applies() {
    let config = gvm::GvmConfig {
        import_policy: ImportPolicy::SkipInvalid,
        ..gvm::GvmConfig::default()
    };
    let mut test = GvmTest::with_config(config);
    let summary = test
        .gvm
        .import_json(r#"{"die": [{"name": "D", "sides": 6}]}"#)
        .unwrap();
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].error.kind(), ErrorKind::Invalid);
}

#[test]
fn test_reserved_owner_entry_rejected() {
    let mut test = GvmTest::new();
    let err = test
        .gvm
        .import_json(r#"{"static": [{"baseVal": 1, "name": "Y", "owner": "public"}]}"#)
        .unwrap_err();
    match err {
        GvmError::Import { source, .. } => {
            assert!(matches!(*source, GvmError::Reserved(ref owner) if owner == "public"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(test.gvm.is_empty());

    // Leaving the owner out still lands the entry under the default owner
    test.gvm
        .import_json(r#"{"static": [{"baseVal": 1, "name": "Y"}]}"#)
        .unwrap();
    assert_eq!(test.gvm.owners(), vec!["public"]);
}

#[test]
fn test_duplicate_calc_input_rejected() {
    let mut test = GvmTest::new();
    test.gvm.set_import_policy(ImportPolicy::SkipInvalid);
    let doc = r#"{
        "static": [{"baseVal": 2, "name": "A"}],
        "calc": [
            {"name": "S", "operation": "+", "values": ["A", "A"]},
            {"name": "T", "operation": "+", "values": ["A"]}
        ]
    }"#;

    let summary = test.gvm.import_json(doc).unwrap();
    assert_eq!(summary.failures.len(), 1);
    assert!(matches!(
        summary.failures[0].error,
        GvmError::DuplicateInput { ref input, .. } if input == "A"
    ));
    assert!(test.gvm.get_id_by_name("S", None).is_err());
    assert_eq!(test.invoke("T", None), 2.0);
}
