use std::collections::BTreeMap;
use rustc_hash::FxHashMap;

use crate::ast::{CharacterDef, ChoiceOption, Label, Node, ScriptAst};
use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::lexer::{Token, TokenKind, TokenMeta};

/// One-token-lookahead recursive descent over the lexer output.
///
/// Parsing never fails: stray tokens are skipped and tokens missing their
/// payload are dropped with a diagnostic, so any input yields a structurally
/// valid (possibly smaller) tree.
pub struct Parser<'a> {
    toks: &'a [Token],
    cursor: usize,
    characters: FxHashMap<String, CharacterDef>,
    diagnostics: Diagnostics,
}

impl<'a> Parser<'a> {
    pub fn new(toks: &'a [Token]) -> Self {
        Self {
            toks,
            cursor: 0,
            characters: FxHashMap::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.toks.get(self.cursor)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.toks.get(self.cursor);
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_none_or(|t| t.kind == TokenKind::Eof)
    }

    fn malformed(&mut self, tok: &Token) {
        self.diagnostics.push(
            DiagnosticKind::MalformedToken,
            Some(tok.line),
            format!("{:?} token without payload dropped", tok.kind),
        );
    }

    pub fn parse(self) -> ScriptAst {
        self.parse_with_diagnostics().0
    }

    pub fn parse_with_diagnostics(mut self) -> (ScriptAst, Diagnostics) {
        let mut labels = FxHashMap::default();

        while !self.is_at_end() {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::Label) => {
                    let label = self.label();
                    if labels.contains_key(&label.name) {
                        log::warn!("Label '{}' defined twice, keeping the last one", label.name);
                    }
                    labels.insert(label.name.clone(), label);
                }
                Some(TokenKind::CharDef) => self.character(),
                _ => {
                    self.bump();
                }
            }
        }

        log::debug!("Parsing complete: {} labels, {} characters", labels.len(), self.characters.len());
        let ast = ScriptAst { labels, characters: self.characters };
        (ast, self.diagnostics)
    }

    fn label(&mut self) -> Label {
        let name = self.bump().map(|t| t.value.clone()).unwrap_or_default();
        let mut nodes = Vec::new();
        while !self.is_at_end() && !self.at(TokenKind::Label) {
            if let Some(node) = self.node() {
                nodes.push(node);
            }
        }
        Label { name, nodes }
    }

    fn node(&mut self) -> Option<Node> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Dialogue => {
                self.bump();
                match &tok.meta {
                    Some(TokenMeta::Dialogue { character, text }) => Some(Node::Dialogue {
                        character: character.clone(),
                        text: text.clone(),
                        line: tok.line,
                    }),
                    _ => {
                        self.malformed(tok);
                        None
                    }
                }
            }
            TokenKind::Variable => {
                self.bump();
                let expression = match &tok.meta {
                    Some(TokenMeta::Variable { expression }) => expression.clone(),
                    _ => tok.value.clone(),
                };
                Some(Node::Variable { expression, line: tok.line })
            }
            TokenKind::Command => {
                self.bump();
                match &tok.meta {
                    Some(TokenMeta::Command { command, args }) => Some(Node::Command {
                        command: command.clone(),
                        args: args.clone(),
                        line: tok.line,
                    }),
                    _ => Some(Node::Command { command: tok.value.clone(), args: String::new(), line: tok.line }),
                }
            }
            TokenKind::Jump => {
                self.bump();
                Some(Node::Jump { target: tok.value.clone(), line: tok.line })
            }
            TokenKind::Choice => self.choice(),
            TokenKind::Condition => Some(self.condition()),
            TokenKind::CharDef => {
                // Definitions are global no matter where they appear.
                self.character();
                None
            }
            _ => {
                self.bump();
                None
            }
        }
    }

    /// Folds a run of consecutive choice tokens into one menu.
    fn choice(&mut self) -> Option<Node> {
        let line = self.peek()?.line;
        let mut choices = Vec::new();
        while self.at(TokenKind::Choice) {
            let Some(tok) = self.bump() else { break };
            match &tok.meta {
                Some(TokenMeta::Choice { text, target, condition }) => choices.push(ChoiceOption {
                    text: text.clone(),
                    target: target.clone(),
                    condition: condition.clone(),
                }),
                _ => self.malformed(tok),
            }
        }
        if choices.is_empty() {
            return None;
        }
        Some(Node::Choice { choices, line })
    }

    /// The body runs until the next condition or label, or stops right after
    /// a jump or choice.
    fn condition(&mut self) -> Node {
        let (condition, line) = match self.bump() {
            Some(tok) => match &tok.meta {
                Some(TokenMeta::Condition { condition }) => (condition.clone(), tok.line),
                _ => (tok.value.clone(), tok.line),
            },
            None => (String::new(), 0),
        };

        let mut then_nodes = Vec::new();
        while !self.is_at_end() && !self.at(TokenKind::Condition) && !self.at(TokenKind::Label) {
            if let Some(node) = self.node() {
                let closes = node.is_control_transfer();
                then_nodes.push(node);
                if closes {
                    break;
                }
            }
        }

        Node::Condition { condition, then_nodes: then_nodes.into(), line }
    }

    fn character(&mut self) {
        let Some(tok) = self.bump() else { return };
        let name = tok.value.clone();
        let mut attributes = BTreeMap::new();

        while self.at(TokenKind::CharAttr) {
            let Some(attr) = self.bump() else { break };
            match &attr.meta {
                Some(TokenMeta::CharAttr { value, .. }) => {
                    attributes.insert(attr.value.clone(), strip_quotes(value).to_string());
                }
                _ => self.malformed(attr),
            }
        }

        log::trace!("character {} with {} attributes", name, attributes.len());
        self.characters.insert(name.clone(), CharacterDef { name, attributes, line: tok.line });
    }
}

/// Removes one layer of matching single or double quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

pub fn parse(tokens: &[Token]) -> ScriptAst {
    Parser::new(tokens).parse()
}
