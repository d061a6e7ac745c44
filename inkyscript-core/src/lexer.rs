//! Line-oriented tokenizer.
//!
//! Every physical line is classified on its own by [`scan_line`], a pure
//! function from `(line, mode)` to `(token, next mode)`. The only state carried
//! between lines is the [`ScanMode`] tag, which tracks the four multi-line
//! constructs: character blocks, block comments and multi-line dialogue.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostic::{DiagnosticKind, Diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Label,
    Dialogue,
    Jump,
    Choice,
    Command,
    Variable,
    Condition,
    CharDef,
    CharAttr,
    Eof,
}

/// Structured payload attached to a token, depending on its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenMeta {
    Dialogue { character: String, text: String },
    Choice { text: String, target: String, condition: Option<String> },
    Command { command: String, args: String },
    Variable { expression: String },
    Condition { condition: String },
    CharAttr { character: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub meta: Option<TokenMeta>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize) -> Self {
        Token { kind, value: value.into(), line, meta: None }
    }

    pub fn with_meta(mut self, meta: TokenMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, "", line)
    }
}

static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^==\s*(.+?)\s*==$").unwrap());
static DIALOGUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\w+)\s+"(.+)"$"#).unwrap());
static DIALOGUE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\w+)\s+"(.*)$"#).unwrap());
static JUMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^->\s*(\w+)$").unwrap());
static CHOICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\s*(.+?)\s*->\s*(\w+)$").unwrap());
static CONDITIONAL_CHOICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\s*\[(.+?)\]\s*(.+?)\s*->\s*(\w+)$").unwrap());
static COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(scene|show|hide|play|stop|pause|wait|clear|shake|flash)\s*(.*)$").unwrap()
});
static VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^~\s*(.+)$").unwrap());
static CONDITION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{\s*(.+?)\s*\}$").unwrap());
static CHAR_DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@char\s+(\w+)$").unwrap());
static CHAR_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+):\s*(.+)$").unwrap());

/// Scanner state carried from one line to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScanMode {
    #[default]
    Normal,
    /// Inside an `@char` header; indented `key: value` lines are attributes.
    CharacterBlock { name: String },
    /// Between a `/*` line and a `*/` line. Holds the mode to resume afterwards.
    Comment(Box<ScanMode>),
    /// Collecting a dialogue whose closing quote has not been seen yet.
    Dialogue { character: String, text: String, start_line: usize },
}

/// Outcome of scanning a single line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineScan {
    pub token: Option<Token>,
    pub mode: ScanMode,
    pub note: Option<(DiagnosticKind, String)>,
}

impl LineScan {
    fn skip(mode: ScanMode) -> Self {
        LineScan { token: None, mode, note: None }
    }

    fn emit(token: Token, mode: ScanMode) -> Self {
        LineScan { token: Some(token), mode, note: None }
    }
}

/// Classifies one raw (untrimmed) line. First match wins.
pub fn scan_line(raw: &str, line_no: usize, mode: ScanMode) -> LineScan {
    let line = raw.trim();
    let indented = raw.starts_with(' ') || raw.starts_with('\t');

    // Inside a block comment only the closing line matters.
    if let ScanMode::Comment(resume) = mode {
        return if !line.starts_with("/*") && line.ends_with("*/") {
            LineScan::skip(*resume)
        } else {
            LineScan::skip(ScanMode::Comment(resume))
        };
    }

    if let Some(caps) = CHAR_DEF.captures(line) {
        let name = caps[1].to_string();
        let note = match &mode {
            ScanMode::Dialogue { character, start_line, .. } => Some((
                DiagnosticKind::UnterminatedDialogue,
                format!("dialogue of {} opened on line {} cut by @char {}", character, start_line, name),
            )),
            _ => None,
        };
        let token = Token::new(TokenKind::CharDef, name.clone(), line_no);
        return LineScan { token: Some(token), mode: ScanMode::CharacterBlock { name }, note };
    }

    let mut mode = mode;
    if let ScanMode::CharacterBlock { name } = &mode {
        if indented {
            if line.is_empty() {
                return LineScan::skip(mode);
            }
            if let Some(caps) = CHAR_ATTR.captures(line) {
                let token = Token::new(TokenKind::CharAttr, &caps[1], line_no).with_meta(TokenMeta::CharAttr {
                    character: name.clone(),
                    value: caps[2].trim().to_string(),
                });
                return LineScan::emit(token, mode);
            }
        } else {
            mode = ScanMode::Normal;
        }
    }

    // Block comments work on whole physical lines only.
    if line.starts_with("/*") {
        return LineScan::skip(ScanMode::Comment(Box::new(mode)));
    }
    if line.ends_with("*/") {
        return LineScan::skip(mode);
    }

    if let ScanMode::Dialogue { character, mut text, start_line } = mode {
        if let Some(last) = line.strip_suffix('"') {
            text.push('\n');
            text.push_str(last);
            let text = text.trim().to_string();
            let token = Token::new(TokenKind::Dialogue, text.clone(), start_line)
                .with_meta(TokenMeta::Dialogue { character, text });
            return LineScan::emit(token, ScanMode::Normal);
        }
        text.push('\n');
        text.push_str(line);
        return LineScan::skip(ScanMode::Dialogue { character, text, start_line });
    }

    if !line.ends_with('"') {
        if let Some(caps) = DIALOGUE_START.captures(line) {
            return LineScan::skip(ScanMode::Dialogue {
                character: caps[1].to_string(),
                text: caps[2].to_string(),
                start_line: line_no,
            });
        }
    }

    if line.is_empty() || line.starts_with("//") {
        return LineScan::skip(mode);
    }

    match match_pattern(line, line_no) {
        Some(token) => LineScan::emit(token, mode),
        None => LineScan {
            token: None,
            mode,
            note: Some((DiagnosticKind::UnmatchedLine, format!("unknown pattern: \"{}\"", line))),
        },
    }
}

fn match_pattern(line: &str, line_no: usize) -> Option<Token> {
    if let Some(caps) = LABEL.captures(line) {
        return Some(Token::new(TokenKind::Label, &caps[1], line_no));
    }

    if let Some(caps) = DIALOGUE.captures(line) {
        return Some(Token::new(TokenKind::Dialogue, &caps[2], line_no).with_meta(TokenMeta::Dialogue {
            character: caps[1].to_string(),
            text: caps[2].to_string(),
        }));
    }

    if let Some(caps) = JUMP.captures(line) {
        return Some(Token::new(TokenKind::Jump, &caps[1], line_no));
    }

    if let Some(caps) = CONDITIONAL_CHOICE.captures(line) {
        return Some(Token::new(TokenKind::Choice, &caps[2], line_no).with_meta(TokenMeta::Choice {
            text: caps[2].to_string(),
            target: caps[3].to_string(),
            condition: Some(caps[1].to_string()),
        }));
    }

    if let Some(caps) = CHOICE.captures(line) {
        return Some(Token::new(TokenKind::Choice, &caps[1], line_no).with_meta(TokenMeta::Choice {
            text: caps[1].to_string(),
            target: caps[2].to_string(),
            condition: None,
        }));
    }

    if let Some(caps) = COMMAND.captures(line) {
        return Some(Token::new(TokenKind::Command, &caps[1], line_no).with_meta(TokenMeta::Command {
            command: caps[1].to_string(),
            args: caps[2].to_string(),
        }));
    }

    if let Some(caps) = VARIABLE.captures(line) {
        return Some(Token::new(TokenKind::Variable, &caps[1], line_no).with_meta(TokenMeta::Variable {
            expression: caps[1].to_string(),
        }));
    }

    if let Some(caps) = CONDITION.captures(line) {
        return Some(Token::new(TokenKind::Condition, &caps[1], line_no).with_meta(TokenMeta::Condition {
            condition: caps[1].to_string(),
        }));
    }

    None
}

pub struct Lexer<'a> {
    src: &'a str,
    diagnostics: Diagnostics,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src, diagnostics: Diagnostics::new() }
    }

    /// Produces the token stream, always terminated by one `Eof` token whose
    /// line is the number of input lines.
    pub fn run(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut mode = ScanMode::Normal;
        let mut line_count = 0;

        for (idx, raw) in self.src.split('\n').enumerate() {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let line_no = idx + 1;
            line_count = line_no;

            let scan = scan_line(raw, line_no, mode);
            if let Some((kind, msg)) = scan.note {
                self.diagnostics.push(kind, Some(line_no), msg);
            }
            if let Some(token) = scan.token {
                tokens.push(token);
            }
            mode = scan.mode;
        }

        if let ScanMode::Dialogue { character, start_line, .. } = &mode {
            self.diagnostics.push(
                DiagnosticKind::UnterminatedDialogue,
                Some(*start_line),
                format!("dialogue of {} never closed", character),
            );
        }

        log::debug!("Lexing complete: {} tokens from {} lines", tokens.len() + 1, line_count);
        tokens.push(Token::eof(line_count));
        tokens
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Convenience wrapper when the diagnostics are not needed.
pub fn tokenize(src: &str) -> Vec<Token> {
    Lexer::new(src).run()
}
