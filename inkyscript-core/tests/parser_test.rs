use inkyscript_core::ast::{ChoiceOption, Node};
use inkyscript_core::lexer::{tokenize, Token, TokenKind};
use inkyscript_core::parser::{parse, Parser};

fn parse_code(input: &str) -> inkyscript_core::ast::ScriptAst {
    let tokens = tokenize(input);
    Parser::new(&tokens).parse()
}

#[test]
fn labels_and_nodes() {
    let ast = parse_code(
        r#"
== Start ==
scene park
MC "Hi"
~ met = true
-> Next

== Next ==
MC "Bye"
"#,
    );
    assert_eq!(ast.labels.len(), 2);
    let start = &ast.labels["Start"];
    assert_eq!(start.name, "Start");
    assert_eq!(start.nodes.len(), 4);
    assert_eq!(
        start.nodes[1],
        Node::Dialogue { character: "MC".into(), text: "Hi".into(), line: 4 }
    );
    assert_eq!(start.nodes[3], Node::Jump { target: "Next".into(), line: 6 });
}

#[test]
fn duplicate_label_last_wins() {
    let ast = parse_code("== A ==\nMC \"one\"\n== A ==\nMC \"two\"\nMC \"three\"");
    assert_eq!(ast.labels.len(), 1);
    assert_eq!(ast.labels["A"].nodes.len(), 2);
}

#[test]
fn consecutive_choices_merge() {
    let ast = parse_code("== Start ==\n* Left -> L\n* [gold > 2] Right -> R\nMC \"after\"\n* Again -> A");
    let nodes = &ast.labels["Start"].nodes;
    assert_eq!(nodes.len(), 3);
    match &nodes[0] {
        Node::Choice { choices, line } => {
            assert_eq!(*line, 2);
            assert_eq!(
                choices,
                &vec![
                    ChoiceOption { text: "Left".into(), target: "L".into(), condition: None },
                    ChoiceOption {
                        text: "Right".into(),
                        target: "R".into(),
                        condition: Some("gold > 2".into()),
                    },
                ]
            );
        }
        other => panic!("expected choice, got {:?}", other),
    }
    assert!(matches!(&nodes[2], Node::Choice { choices, .. } if choices.len() == 1));
}

#[test]
fn condition_collects_until_next_condition() {
    let ast = parse_code(
        "== Start ==\n{ a > 1 }\nMC \"big\"\nscene x\n{ a < 1 }\nMC \"small\"\n== Other ==",
    );
    let nodes = &ast.labels["Start"].nodes;
    assert_eq!(nodes.len(), 2);
    match (&nodes[0], &nodes[1]) {
        (
            Node::Condition { condition: c1, then_nodes: t1, .. },
            Node::Condition { condition: c2, then_nodes: t2, .. },
        ) => {
            assert_eq!(c1, "a > 1");
            assert_eq!(t1.len(), 2);
            assert_eq!(c2, "a < 1");
            assert_eq!(t2.len(), 1);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn condition_stops_after_choice_menu() {
    let ast = parse_code("== Start ==\n{ ok == true }\n* Yes -> Y\n* No -> N\nMC \"outside\"");
    let nodes = &ast.labels["Start"].nodes;
    assert_eq!(nodes.len(), 2);
    match &nodes[0] {
        Node::Condition { then_nodes, .. } => {
            assert_eq!(then_nodes.len(), 1);
            assert!(matches!(&then_nodes[0], Node::Choice { choices, .. } if choices.len() == 2));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn character_definitions() {
    let ast = parse_code("@char MC\n  name: \"Player\"\n  sprite: 'mc_{expression}.png'\n  color: #4A90E2\n== Start ==\n@char Sayori\n  name: Sayori");
    assert_eq!(ast.characters.len(), 2);
    let mc = &ast.characters["MC"];
    assert_eq!(mc.line, 1);
    assert_eq!(mc.attributes["name"], "Player");
    assert_eq!(mc.attributes["sprite"], "mc_{expression}.png");
    assert_eq!(mc.attributes["color"], "#4A90E2");
    assert_eq!(ast.characters["Sayori"].attributes["name"], "Sayori");
    assert!(ast.labels["Start"].nodes.is_empty());
}

#[test]
fn targets_are_not_validated() {
    let ast = parse_code("== Start ==\n-> Nowhere");
    assert_eq!(ast.labels["Start"].nodes[0], Node::Jump { target: "Nowhere".into(), line: 2 });
}

#[test]
fn never_fails_on_odd_token_streams() {
    assert!(parse(&[]).labels.is_empty());

    // no EOF, payload-less tokens, stray attributes
    let toks = vec![
        Token::new(TokenKind::CharAttr, "name", 1),
        Token::new(TokenKind::Dialogue, "orphan", 2),
        Token::new(TokenKind::Label, "Start", 3),
        Token::new(TokenKind::Dialogue, "no meta", 4),
        Token::new(TokenKind::Choice, "no meta", 5),
        Token::new(TokenKind::Condition, "x == 1", 6),
    ];
    let (ast, diags) = Parser::new(&toks).parse_with_diagnostics();
    let nodes = &ast.labels["Start"].nodes;
    assert_eq!(nodes.len(), 1);
    assert!(matches!(&nodes[0], Node::Condition { condition, then_nodes, .. }
        if condition == "x == 1" && then_nodes.is_empty()));
    assert_eq!(diags.len(), 2);
}

#[test]
fn empty_label() {
    let ast = parse_code("== Start ==\n== Next ==\nMC \"x\"");
    assert!(ast.labels["Start"].nodes.is_empty());
    assert_eq!(ast.labels["Next"].nodes.len(), 1);
}
