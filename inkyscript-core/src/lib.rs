//! Front end of the story-script language: tokens, AST, lexer and parser.
//!
//! ```
//! use inkyscript_core::{lexer::Lexer, parser::Parser};
//!
//! let tokens = Lexer::new("== Start ==\nMC \"Hi\"\n").run();
//! let ast = Parser::new(&tokens).parse();
//! assert_eq!(ast.labels["Start"].nodes.len(), 1);
//! ```

pub mod ast;
pub mod diagnostic;
pub mod lexer;
pub mod parser;

pub use ast::{ChoiceOption, CharacterDef, Label, Node, ScriptAst};
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use lexer::{tokenize, Lexer, Token, TokenKind, TokenMeta};
pub use parser::{parse, Parser};
