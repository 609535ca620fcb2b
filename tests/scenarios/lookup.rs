//! Owner resolution and sheet output scenarios

use gvm::error::GvmError;
use gvm::manager::StaticDef;

use crate::harness::GvmTest;

#[test]
fn test_owner_values_shadow_public() {
    let test = GvmTest::character();
    assert_eq!(test.base("STR", Some("P1")), 16.0);
    assert_eq!(test.base("STR", Some("P2")), 8.0);

    // PROF only exists publicly
    let public = test.id("PROF", None);
    assert_eq!(test.id("PROF", Some("P1")), public);
    assert_eq!(test.id("PROF", Some("P2")), public);
}

#[test]
fn test_missing_names_are_typed_errors() {
    let test = GvmTest::character();
    assert!(matches!(
        test.gvm.get_id_by_name("STR", Some("P3")),
        Err(GvmError::NameNotFound { .. })
    ));
    assert!(matches!(
        test.gvm.get_id_by_name("STR", None),
        Err(GvmError::NameNotFound { .. })
    ));
    assert!(test.gvm.get_game_value_entry_by_name("Nope", Some("P1")).is_err());
}

#[test]
fn test_sheet_is_public_union_owner() {
    let test = GvmTest::character();
    let sheet = test.gvm.output_sheet(Some("P1"));
    let names: Vec<&str> = sheet.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "AC",
            "AMOD_DEX",
            "AMOD_STR",
            "ATK",
            "BaseAC",
            "D20",
            "DEX",
            "DMG",
            "DMG_DICE",
            "Greatsword",
            "HP",
            "LVL",
            "PROF",
            "STR"
        ]
    );
    assert_eq!(sheet["STR"], "16");
    assert_eq!(sheet["HP"], "12 / 12");
    assert!(sheet["D20"].ends_with("(1d20)"));

    let p2 = test.gvm.output_sheet(Some("P2"));
    assert_eq!(p2.len(), 5);
    assert_eq!(p2["STR"], "8");

    let public = test.gvm.output_sheet(None);
    assert_eq!(
        public.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["BaseAC", "D20", "DMG_DICE", "PROF"]
    );
}

#[test]
fn test_duplicate_add_preserves_original() {
    let mut test = GvmTest::character();
    let original = test.id("DEX", Some("P1"));

    let err = test
        .gvm
        .add(StaticDef::new("DEX", 18.0), Some("P1"))
        .unwrap_err();
    assert!(matches!(err, GvmError::NameTaken { .. }));
    assert_eq!(test.id("DEX", Some("P1")), original);
    assert_eq!(test.base("DEX", Some("P1")), 14.0);
    assert_eq!(test.gvm.len(), 15);
}

#[test]
fn test_remove_then_fallback() {
    let mut test = GvmTest::character();
    let public = test.gvm.add(StaticDef::new("DEX", 10.0), None).unwrap();
    let own = test.id("DEX", Some("P1"));

    // AMOD_DEX still depends on P1's DEX
    assert!(matches!(
        test.gvm.remove(own, Some("P1")),
        Err(GvmError::InUse { .. })
    ));

    let ac = test.id("AC", Some("P1"));
    let amod = test.id("AMOD_DEX", Some("P1"));
    test.gvm.remove(ac, Some("P1")).unwrap();
    test.gvm.remove(amod, Some("P1")).unwrap();
    test.gvm.remove(own, Some("P1")).unwrap();

    assert_eq!(test.gvm.get_id_by_name("DEX", Some("P1")).ok(), public.id());
}
