//! `~` expressions and `{ }` conditions.

use once_cell::sync::Lazy;
use regex::Regex;

use inkyscript_core::diagnostic::DiagnosticKind;

use super::value::{parse_number, Value};
use super::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
    Set,
}

// Compound forms come first: `=` is a substring of all of them.
static ASSIGN_FORMS: Lazy<[(AssignOp, Regex); 5]> = Lazy::new(|| {
    [
        (AssignOp::Add, Regex::new(r"^(\w+)\s*\+=\s*(.+)$").unwrap()),
        (AssignOp::Sub, Regex::new(r"^(\w+)\s*-=\s*(.+)$").unwrap()),
        (AssignOp::Mul, Regex::new(r"^(\w+)\s*\*=\s*(.+)$").unwrap()),
        (AssignOp::Div, Regex::new(r"^(\w+)\s*/=\s*(.+)$").unwrap()),
        (AssignOp::Set, Regex::new(r"^(\w+)\s*=\s*(.+)$").unwrap()),
    ]
});

// Two-character operators are listed before their one-character prefixes.
static COMPARISON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w.]+)\s*(>=|<=|==|!=|>|<)\s*(.+)$").unwrap());

impl Runtime {
    /// Applies an assignment such as `affection = 0` or `affection += 10`.
    /// Anything else is recorded as a diagnostic and ignored.
    pub fn evaluate_expression(&mut self, expression: &str) {
        let expression = expression.trim();

        let matched = ASSIGN_FORMS.iter().find_map(|(op, re)| {
            re.captures(expression).map(|caps| (*op, caps[1].to_string(), caps[2].to_string()))
        });
        let Some((op, name, rhs)) = matched else {
            self.diagnostics.borrow_mut().push(
                DiagnosticKind::UnknownExpression,
                None,
                format!("unknown expression: {}", expression),
            );
            return;
        };

        let rhs = self.parse_value(&rhs);
        // absent or falsy left operands count as 0
        let current = || {
            self.get_variable(&name)
                .filter(|v| v.is_truthy())
                .cloned()
                .unwrap_or(Value::Num(0.0))
        };
        let value = match op {
            AssignOp::Set => rhs,
            AssignOp::Add => current().add(&rhs),
            AssignOp::Sub => current().sub(&rhs),
            AssignOp::Mul => current().mul(&rhs),
            AssignOp::Div => current().div(&rhs),
        };
        self.set_variable(name, value);
    }

    /// Reads a literal or reference on the right-hand side of an expression
    /// or comparison.
    ///
    /// Quoted text, `true`/`false` and numbers are literals. `Char.attr` looks
    /// up a character attribute and a bare name looks up a variable; when the
    /// lookup finds nothing the text itself is returned as a string.
    pub fn parse_value(&self, text: &str) -> Value {
        let text = text.trim();

        if text.starts_with(['"', '\'']) {
            return Value::Str(strip_outer(text).to_string());
        }

        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        if let Some(n) = parse_number(text) {
            return Value::Num(n);
        }

        if let Some((character, attribute)) = split_dotted(text) {
            if let Some(attr) = self.get_character_attribute(character, attribute) {
                return Value::Str(attr.to_string());
            }
        }

        if let Some(value) = self.get_variable(text) {
            return value.clone();
        }

        Value::Str(text.to_string())
    }

    /// Evaluates a `{ }` condition.
    ///
    /// `&&` is split first and every part must hold; otherwise `||` is split
    /// and any part may hold. There is no other precedence and no grouping, so
    /// `a || b && c` reads as `(a || b) && c`. Unrecognised text is false.
    pub fn evaluate_condition(&self, condition: &str) -> bool {
        let condition = condition.trim();

        if condition.contains("&&") {
            return condition.split("&&").all(|part| self.evaluate_condition(part));
        }
        if condition.contains("||") {
            return condition.split("||").any(|part| self.evaluate_condition(part));
        }

        let Some(caps) = COMPARISON.captures(condition) else {
            self.diagnostics.borrow_mut().push(
                DiagnosticKind::UnknownCondition,
                None,
                format!("unknown condition: {}", condition),
            );
            return false;
        };

        let left_name = &caps[1];
        let operator = &caps[2];
        let right = self.parse_value(&caps[3]);

        let left = match split_dotted(left_name) {
            Some((character, attribute)) => {
                self.get_character_attribute(character, attribute).map(|a| Value::Str(a.to_string()))
            }
            None => self.get_variable(left_name).cloned(),
        };

        let result = compare(left.as_ref(), operator, &right);
        log::debug!("Condition {} {} {} -> {:?} = {}", left_name, operator, right, left, result);
        result
    }
}

/// Applies a comparison operator. A missing left side is unequal to
/// everything and never orders.
fn compare(left: Option<&Value>, operator: &str, right: &Value) -> bool {
    let Some(left) = left else {
        return operator == "!=";
    };
    match operator {
        "==" => left.loose_eq(right),
        "!=" => !left.loose_eq(right),
        ">" => left.loose_cmp(right).is_some_and(|o| o.is_gt()),
        "<" => left.loose_cmp(right).is_some_and(|o| o.is_lt()),
        ">=" => left.loose_cmp(right).is_some_and(|o| o.is_ge()),
        "<=" => left.loose_cmp(right).is_some_and(|o| o.is_le()),
        _ => false,
    }
}

/// `Char.attr` split at the first dot; later segments are ignored.
fn split_dotted(text: &str) -> Option<(&str, &str)> {
    let (character, rest) = text.split_once('.')?;
    Some((character, rest.split('.').next().unwrap_or(rest)))
}

/// Drops the first and last character of a quoted literal.
fn strip_outer(text: &str) -> &str {
    let inner = &text[1..];
    match inner.char_indices().last() {
        Some((idx, _)) => &inner[..idx],
        None => "",
    }
}
