//! Invocation scenario tests

use std::collections::BTreeSet;

use gvm::error::{ErrorKind, GvmError};
use gvm::DiceError;
use gvm::manager::{CalcDef, StaticDef};
use gvm::values::substitute_tokens;

use crate::harness::GvmTest;

#[test]
fn test_static_and_scalar_are_idempotent() {
    let mut test = GvmTest::character();
    for _ in 0..5 {
        assert_eq!(test.invoke("BaseAC", None), 10.0);
        assert_eq!(test.invoke("HP", Some("P1")), 12.0);
    }
}

#[test]
fn test_die_range_and_variation() {
    let mut test = GvmTest::character();
    let mut seen = BTreeSet::new();
    for _ in 0..200 {
        let v = test.invoke("DMG_DICE", None);
        assert!((2.0..=12.0).contains(&v), "2d6 rolled {}", v);
        seen.insert(v as i64);
    }
    assert!(seen.len() > 5);
}

#[test]
fn test_calc_reads_fresh_inputs() {
    let mut test = GvmTest::character();
    assert_eq!(test.invoke("AC", Some("P1")), 12.0);

    let dex = test.id("DEX", Some("P1"));
    test.gvm.set_value(dex, 18.0).unwrap();
    assert_eq!(test.invoke("AC", Some("P1")), 14.0);
    assert_eq!(test.base("AMOD_DEX", Some("P1")), 4.0);
}

#[test]
fn test_attack_follows_die() {
    let mut test = GvmTest::character();
    for _ in 0..50 {
        let atk = test.invoke("ATK", Some("P1"));
        let d20 = test.base("D20", None);
        assert_eq!(atk, d20 + 3.0 + 2.0);
    }
}

#[test]
fn test_substitution_example() {
    let named = vec![("DEX".to_string(), 3.0), ("D20".to_string(), 14.0)];
    assert_eq!(substitute_tokens("#DEX + #D20", &named).unwrap(), "3 + 14");

    let mut test = GvmTest::new();
    test.gvm.add(StaticDef::new("DEX", 3.0), None).unwrap();
    test.gvm.add(StaticDef::new("D20", 14.0), None).unwrap();
    test.gvm
        .add(CalcDef::new("ATK", "#DEX + #D20", &["DEX", "D20"]), None)
        .unwrap();
    assert_eq!(test.invoke("ATK", None), 17.0);
}

#[test]
fn test_zero_is_substituted() {
    let mut test = GvmTest::new();
    test.gvm.add(StaticDef::new("ZERO", 0.0), None).unwrap();
    test.gvm
        .add(CalcDef::new("X", "(#ZERO) + 1", &["ZERO"]), None)
        .unwrap();
    assert_eq!(test.invoke("X", None), 1.0);
}

#[test]
fn test_scalar_limits_through_manager() {
    let mut test = GvmTest::character();
    let hp = test.id("HP", Some("P1"));

    assert!(matches!(
        test.gvm.set_value(hp, 13.0),
        Err(GvmError::OutOfBounds { .. })
    ));
    assert_eq!(test.gvm.set_sum(hp, &[-5.0, -4.0], false).unwrap(), 3.0);
    assert_eq!(test.gvm.set_sum(hp, &[-10.0], false).unwrap(), 0.0);
    assert!(test.gvm.set_sum(hp, &[-1.0], true).is_err());
    assert_eq!(test.base("HP", Some("P1")), 0.0);

    let ac = test.id("BaseAC", None);
    assert!(matches!(
        test.gvm.set_sum(ac, &[1.0], false),
        Err(GvmError::NotScalar(_))
    ));
}

#[test]
fn test_roll_strings() {
    let mut test = GvmTest::character();
    assert_eq!(test.gvm.roll("#STR + #PROF", Some("P1")).unwrap(), 18.0);
    assert_eq!(test.gvm.roll("#STR + #PROF", Some("P2")).unwrap(), 10.0);

    for _ in 0..20 {
        let v = test.gvm.roll("1d8 + #AMOD_STR", Some("P1")).unwrap();
        assert!((4.0..=11.0).contains(&v));
    }

    assert!(matches!(
        test.gvm.roll("#WIS", Some("P1")),
        Err(GvmError::NameNotFound { .. })
    ));
}

#[test]
fn test_hostile_roll_strings() {
    let mut test = GvmTest::character();
    let deep = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
    let err = test.gvm.roll(&deep, None).unwrap_err();
    assert!(matches!(err, GvmError::Dice(DiceError::TooDeep(_))));
    assert_eq!(err.kind(), ErrorKind::Invalid);

    assert!(matches!(
        test.gvm.roll("4000000000d6 + #STR", Some("P1")),
        Err(GvmError::Dice(DiceError::InvalidDice(_)))
    ));

    // The manager is still usable afterwards
    assert_eq!(test.gvm.roll("#STR + #PROF", Some("P1")).unwrap(), 18.0);
}

#[test]
fn test_display_strings() {
    let test = GvmTest::character();
    let ac = test.id("AC", Some("P1"));
    assert_eq!(test.gvm.display(ac).unwrap(), "AC: 12 = {+} [BaseAC, AMOD_DEX]");

    let lvl = test.id("LVL", Some("P1"));
    assert_eq!(test.gvm.display(lvl).unwrap(), "LVL: 3 < 1 | 20 >");

    let d20 = test.id("D20", None);
    assert!(test.gvm.display(d20).unwrap().ends_with("<1d20>"));
}
