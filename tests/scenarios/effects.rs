//! Effect scenario tests
//!
//! Greatsword (6, tags damage/melee) feeds DMG = Greatsword + AMOD_STR (3).

use gvm::error::GvmError;
use gvm::manager::EffectDef;
use gvm::InvokeOptions;

use crate::harness::GvmTest;

#[test]
fn test_tag_targeting() {
    let mut test = GvmTest::character();
    assert_eq!(test.invoke_with("AC", Some("P1"), &["shield"]), 17.0);
    // Untargeted values ignore the effect
    assert_eq!(test.invoke_with("BaseAC", None, &["shield"]), 10.0);
    assert_eq!(test.invoke_with("AMOD_DEX", Some("P1"), &["shield"]), 2.0);
}

#[test]
fn test_effects_reach_inputs() {
    let mut test = GvmTest::character();
    assert_eq!(test.invoke("DMG", Some("P1")), 9.0);
    assert_eq!(test.invoke_with("DMG", Some("P1"), &["flaming"]), 12.0);
    assert_eq!(test.invoke_with("DMG", Some("P1"), &["crit"]), 15.0);

    // Effects never touch the stored base
    assert_eq!(test.base("Greatsword", Some("P1")), 6.0);
    assert_eq!(test.invoke("DMG", Some("P1")), 9.0);
}

#[test]
fn test_negate_base() {
    let mut test = GvmTest::character();
    assert_eq!(test.invoke_with("Greatsword", Some("P1"), &["resistance"]), 3.0);
    assert_eq!(test.invoke_with("DMG", Some("P1"), &["resistance"]), 6.0);

    // Negated once, with both modifiers summed: 3 (fire) + 3 (half)
    assert_eq!(
        test.invoke_with("Greatsword", Some("P1"), &["flaming", "resistance"]),
        6.0
    );

    for _ in 0..50 {
        let v = test.invoke_with("DMG_DICE", None, &["resistance"]);
        let rolled = test.base("DMG_DICE", None);
        assert_eq!(v, (rolled / 2.0).floor());
    }
}

#[test]
fn test_bless_range() {
    let mut test = GvmTest::character();
    for _ in 0..50 {
        let v = test.invoke_with("ATK", Some("P1"), &["bless"]);
        let d20 = test.base("D20", None);
        let bonus = v - (d20 + 5.0);
        assert!((1.0..=4.0).contains(&bonus), "bless added {}", bonus);
    }
}

#[test]
fn test_caller_supplied_effects() {
    let mut test = GvmTest::character();
    test.gvm
        .add(
            EffectDef::new("training", "#self * #MULT")
                .with_value("MULT", 2.0)
                .targeting(&["melee"]),
            None,
        )
        .unwrap();

    let sword = test.id("Greatsword", Some("P1"));
    let options = InvokeOptions::with_effect_names(["training"]);
    assert_eq!(test.gvm.invoke(sword, &options).unwrap(), 18.0);
    assert_eq!(
        test.gvm
            .invoke(sword, &InvokeOptions::without_effects())
            .unwrap(),
        6.0
    );
}

#[test]
fn test_unknown_effect() {
    let mut test = GvmTest::character();
    let dmg = test.id("DMG", Some("P1"));
    assert!(matches!(
        test.gvm.invoke_with_effects(dmg, &["crit", "vorpal"]),
        Err(GvmError::EffectNotFound(ref name)) if name == "vorpal"
    ));
}

#[test]
fn test_remove_effect() {
    let mut test = GvmTest::character();
    let removed = test.gvm.remove_effect("crit").unwrap();
    assert!(!removed.negate_base());
    assert!(test.gvm.effect("crit").is_err());

    // The name can be registered again
    test.gvm
        .add(EffectDef::new("crit", "#self * 2").targeting(&["damage"]), None)
        .unwrap();
    assert_eq!(test.invoke_with("Greatsword", Some("P1"), &["crit"]), 18.0);
}
