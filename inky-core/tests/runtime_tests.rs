use std::collections::BTreeMap;

use inky_core::runtime::{Runtime, Value};
use inkyscript_core::ast::ChoiceOption;
use inkyscript_core::DiagnosticKind;

fn with_player() -> Runtime {
    let mut rt = Runtime::new();
    let mut attrs = BTreeMap::new();
    attrs.insert("name".to_string(), "Player".to_string());
    attrs.insert("color".to_string(), "#ffcc00".to_string());
    rt.register_character("MC", attrs);
    rt
}

#[test]
fn compound_assignment_reads_current_value() {
    let mut rt = Runtime::new();
    rt.evaluate_expression("affection = 0");
    assert_eq!(rt.get_variable("affection"), Some(&Value::Num(0.0)));
    rt.evaluate_expression("affection += 5");
    assert_eq!(rt.get_variable("affection"), Some(&Value::Num(5.0)));
    rt.evaluate_expression("affection += 5");
    assert_eq!(rt.get_variable("affection"), Some(&Value::Num(10.0)));
    rt.evaluate_expression("affection *= 3");
    rt.evaluate_expression("affection /= 2");
    rt.evaluate_expression("affection -= 1");
    assert_eq!(rt.get_variable("affection"), Some(&Value::Num(14.0)));
}

#[test]
fn compound_assignment_on_absent_variable_starts_from_zero() {
    let mut rt = Runtime::new();
    rt.evaluate_expression("gold += 3");
    rt.evaluate_expression("debt -= 1");
    assert_eq!(rt.get_variable("gold"), Some(&Value::Num(3.0)));
    assert_eq!(rt.get_variable("debt"), Some(&Value::Num(-1.0)));
}

#[test]
fn right_hand_values() {
    let mut rt = with_player();
    rt.evaluate_expression("name = \"Al\"");
    rt.evaluate_expression("name += \"ex\"");
    assert_eq!(rt.get_variable("name"), Some(&Value::from("Alex")));

    rt.evaluate_expression("met = true");
    assert_eq!(rt.get_variable("met"), Some(&Value::Bool(true)));

    rt.evaluate_expression("copy = name");
    assert_eq!(rt.get_variable("copy"), Some(&Value::from("Alex")));

    rt.evaluate_expression("mood = happy");
    assert_eq!(rt.get_variable("mood"), Some(&Value::from("happy")));

    rt.evaluate_expression("who = MC.name");
    assert_eq!(rt.get_variable("who"), Some(&Value::from("Player")));
}

#[test]
fn unknown_expression_is_ignored() {
    let mut rt = Runtime::new();
    rt.evaluate_expression("affection ++");
    assert!(!rt.has_variable("affection"));
    assert_eq!(rt.diagnostics().count(DiagnosticKind::UnknownExpression), 1);
}

#[test]
fn and_with_undefined_operand_is_false() {
    let mut rt = Runtime::new();
    rt.set_variable("a", Value::Num(1.0));
    assert!(rt.evaluate_condition("a > 0"));
    assert!(!rt.evaluate_condition("b > 0"));
    assert!(!rt.evaluate_condition("a > 0 && b > 0"));
    assert!(rt.evaluate_condition("a > 0 || b > 0"));
}

#[test]
fn and_evaluates_every_operand() {
    let mut rt = Runtime::new();
    rt.set_variable("a", Value::Num(1.0));
    rt.set_variable("b", Value::Num(0.0));
    // a holds, so the verdict comes from the b lookup
    assert!(!rt.evaluate_condition("a > 0 && b > 0"));
    rt.set_variable("b", Value::Num(2.0));
    assert!(rt.evaluate_condition("a > 0 && b > 0"));

    // the right-hand part is reached even when it cannot be read
    assert!(!rt.evaluate_condition("a > 0 && b is big"));
    assert_eq!(rt.diagnostics().count(DiagnosticKind::UnknownCondition), 1);
}

#[test]
fn and_splits_before_or() {
    let mut rt = Runtime::new();
    rt.set_variable("a", Value::Num(1.0));
    // (a == 1 || b == 1) && c == 1
    assert!(!rt.evaluate_condition("a == 1 || b == 1 && c == 1"));
    rt.set_variable("c", Value::Num(1.0));
    assert!(rt.evaluate_condition("a == 1 || b == 1 && c == 1"));
}

#[test]
fn two_character_operators_win() {
    let mut rt = Runtime::new();
    rt.set_variable("x", Value::Num(5.0));
    assert!(rt.evaluate_condition("x >= 5"));
    assert!(rt.evaluate_condition("x <= 5"));
    assert!(!rt.evaluate_condition("x > 5"));
    assert!(!rt.evaluate_condition("x < 5"));
    assert!(!rt.evaluate_condition("x != 5"));
}

#[test]
fn loose_comparisons() {
    let mut rt = Runtime::new();
    rt.evaluate_expression("x = \"5\"");
    assert!(rt.evaluate_condition("x == 5"));
    assert!(rt.evaluate_condition("x > 4"));
    rt.evaluate_expression("met = true");
    assert!(rt.evaluate_condition("met == true"));
    assert!(rt.evaluate_condition("met == 1"));
}

#[test]
fn missing_left_side_is_only_unequal() {
    let rt = Runtime::new();
    assert!(!rt.evaluate_condition("ghost == 0"));
    assert!(!rt.evaluate_condition("ghost < 1"));
    assert!(rt.evaluate_condition("ghost != 0"));
}

#[test]
fn character_attributes_in_conditions() {
    let rt = with_player();
    assert!(rt.evaluate_condition("MC.name == \"Player\""));
    assert!(!rt.evaluate_condition("MC.missing == \"\""));
    assert!(!rt.evaluate_condition("Nobody.name == \"Player\""));
    assert_eq!(rt.get_character_attribute("MC", "color"), Some("#ffcc00"));
    assert_eq!(rt.get_character_attribute("MC", "voice"), None);
    assert!(rt.get_character("Nobody").is_none());
}

#[test]
fn register_character_overwrites() {
    let mut rt = with_player();
    rt.register_character("MC", BTreeMap::new());
    assert_eq!(rt.get_character("MC").map(|a| a.len()), Some(0));
}

#[test]
fn unknown_condition_is_false() {
    let rt = Runtime::new();
    assert!(!rt.evaluate_condition("just words"));
    assert_eq!(rt.diagnostics().count(DiagnosticKind::UnknownCondition), 1);
    assert_eq!(rt.take_diagnostics().len(), 1);
    assert!(rt.diagnostics().is_empty());
}

#[test]
fn interpolation() {
    let mut rt = with_player();
    rt.set_variable("gold", Value::Num(3.0));
    assert_eq!(
        rt.interpolate("Hi {MC.name}, you have {gold} gold and {missing}"),
        "Hi Player, you have 3 gold and {missing}"
    );
}

#[test]
fn choice_enabled_follows_condition() {
    let mut rt = Runtime::new();
    let gated = ChoiceOption { text: "Buy".into(), target: "Shop".into(), condition: Some("gold > 10".into()) };
    let open = ChoiceOption { text: "Leave".into(), target: "End".into(), condition: None };
    assert!(!rt.is_choice_enabled(&gated));
    assert!(rt.is_choice_enabled(&open));
    rt.set_variable("gold", Value::Num(20.0));
    assert!(rt.is_choice_enabled(&gated));
}

#[test]
fn jump_does_not_validate() {
    let mut rt = Runtime::new();
    rt.advance();
    rt.jump("Nowhere");
    assert_eq!(rt.position().label, "Nowhere");
    assert_eq!(rt.position().node_index, 0);
}

#[test]
fn state_dump() {
    let mut rt = Runtime::new();
    rt.set_variable("gold", Value::Num(3.0));
    rt.set_variable("name", Value::from("Alex"));
    rt.advance();

    let state = rt.snapshot();
    assert_eq!(state.label, "Start");
    assert_eq!(state.node_index, 1);
    assert_eq!(state.variables.len(), 2);

    let json: serde_json::Value = serde_json::from_str(&rt.get_state()).unwrap();
    assert_eq!(json["label"], "Start");
    assert_eq!(json["variables"]["gold"].as_f64(), Some(3.0));
    assert_eq!(json["variables"]["name"], "Alex");
}

#[test]
fn reset_keeps_characters() {
    let mut rt = with_player();
    rt.set_variable("gold", Value::Num(3.0));
    rt.jump("Shop");
    rt.reset();
    assert!(!rt.has_variable("gold"));
    assert_eq!(rt.position().label, "Start");
    assert!(rt.get_character("MC").is_some());
}
