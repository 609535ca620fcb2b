//! Character sheet scenarios over the fixture

use gvm::error::GvmError;
use gvm::{CharacterSheet, Slot, SlotKind, SlotScope};

use crate::harness::GvmTest;

fn layout() -> CharacterSheet {
    CharacterSheet::from_json(
        r#"{
            "slots": {
                "strength": {"kind": "value", "scope": "player", "required": true},
                "hit_points": {"kind": "scalar", "scope": "player", "required": true},
                "attack": {"kind": "calc", "scope": "sheet", "required": true},
                "d20": {"kind": "die", "scope": "public"},
                "alignment": {"kind": "option", "required": true}
            }
        }"#,
    )
    .expect("layout should parse")
}

#[test]
fn test_fill_sheet_from_fixture() {
    let mut test = GvmTest::character();
    let mut sheet = layout();

    for (slot, name, owner) in [
        ("strength", "STR", Some("P1")),
        ("hit_points", "HP", Some("P1")),
        ("attack", "ATK", Some("P1")),
        ("d20", "D20", None),
    ] {
        let id = test.id(name, owner);
        sheet.bind_slot(&test.gvm, slot, id).unwrap();
    }
    assert!(sheet.configured());

    assert_eq!(sheet.slot_value(&test.gvm, "strength").unwrap().base_value(), 16.0);
    let atk = sheet.invoke_slot(&mut test.gvm, "attack").unwrap();
    assert!((6.0..=25.0).contains(&atk));

    let output = sheet.output(&test.gvm);
    assert_eq!(output["hit_points"], "12 / 12");
    assert_eq!(output["strength"], "16");
    assert!(!output.contains_key("alignment"));
}

#[test]
fn test_kind_mismatch() {
    let test = GvmTest::character();
    let mut sheet = layout();
    let str_id = test.id("STR", Some("P1"));
    let err = sheet.bind_slot(&test.gvm, "attack", str_id).unwrap_err();
    assert!(matches!(err, GvmError::SlotKindMismatch { ref found, .. } if found == "static"));
}

#[test]
fn test_template_round_trip() {
    let test = GvmTest::character();
    let mut sheet = layout();
    sheet
        .bind_slot(&test.gvm, "strength", test.id("STR", Some("P1")))
        .unwrap();
    sheet
        .add_slot("armor", Slot::new(SlotKind::Calc, SlotScope::Player, false))
        .unwrap();

    let template = sheet.create_template();
    assert!(template.is_template());
    assert!(!template.configured());
    assert!(template.slot("armor").is_ok());
    assert!(matches!(
        template.slot_id("strength"),
        Err(GvmError::SlotUnbound(_))
    ));

    // A second player fills in a copy of the template
    let mut p2 = template.instantiate();
    p2.bind_slot(&test.gvm, "strength", test.id("STR", Some("P2")))
        .unwrap();
    assert_eq!(p2.slot_value(&test.gvm, "strength").unwrap().base_value(), 8.0);
    assert_eq!(sheet.slot_value(&test.gvm, "strength").unwrap().base_value(), 16.0);
}
