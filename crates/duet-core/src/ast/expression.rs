// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expressions.
//!
//! Expressions are attributes of statement nodes (a `While` condition, the two
//! sides of an `Assignment`, ...). They are plain owned values: they have no
//! [`NodeId`](super::NodeId), no parent link, and the traversal engine never
//! dispatches them. A visitor that cares about expressions reads them from the
//! typed payload it is handed.

use std::fmt;

use serde::Serialize;

use super::NodeKind;
use crate::error::MalformedNodeError;

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

/// Binary operators, loosest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    /// Binding strength; higher binds tighter. All binary operators are
    /// left-associative.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 6,
        }
    }
}

const UNARY_PRECEDENCE: u8 = 7;
const POSTFIX_PRECEDENCE: u8 = 8;
const ATOM_PRECEDENCE: u8 = 9;

/// An expression attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Identifier(String),
    Literal(Literal),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// A function invocation. `target` may carry a package qualifier
    /// (`system:println`).
    Call {
        target: String,
        args: Vec<Expression>,
    },
    FieldAccess {
        target: Box<Expression>,
        field: String,
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Expression {
    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expression::Literal(Literal::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Expression::Literal(Literal::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal(Literal::Boolean(value))
    }

    pub fn null() -> Self {
        Expression::Literal(Literal::Null)
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn call(target: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call {
            target: target.into(),
            args,
        }
    }

    pub fn field(target: Expression, field: impl Into<String>) -> Self {
        Expression::FieldAccess {
            target: Box::new(target),
            field: field.into(),
        }
    }

    pub fn index(target: Expression, index: Expression) -> Self {
        Expression::Index {
            target: Box::new(target),
            index: Box::new(index),
        }
    }

    /// True if the expression can appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expression::Identifier(_) | Expression::FieldAccess { .. } | Expression::Index { .. }
        )
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expression::Call { .. })
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Identifier(_) | Expression::Literal(_) | Expression::Call { .. } => {
                ATOM_PRECEDENCE
            }
            Expression::Unary { .. } => UNARY_PRECEDENCE,
            Expression::Binary { op, .. } => op.precedence(),
            Expression::FieldAccess { .. } | Expression::Index { .. } => POSTFIX_PRECEDENCE,
        }
    }

    /// True if the printed form begins with a number literal.
    fn starts_with_number(&self) -> bool {
        match self {
            Expression::Literal(Literal::Int(_) | Literal::Float(_)) => true,
            Expression::FieldAccess { target, .. } | Expression::Index { target, .. } => {
                target.starts_with_number()
            }
            _ => false,
        }
    }

    /// Check every name inside the expression.
    ///
    /// `kind` and `field` say where the expression is being attached, for the
    /// error message.
    pub fn validate(&self, kind: NodeKind, field: &'static str) -> Result<(), MalformedNodeError> {
        match self {
            Expression::Identifier(name) => check_identifier(kind, field, name),
            Expression::Literal(Literal::Float(value)) if !value.is_finite() => {
                Err(MalformedNodeError::InvalidField {
                    kind,
                    field,
                    reason: format!("holds a non-finite float literal ({})", value),
                })
            }
            Expression::Literal(_) => Ok(()),
            Expression::Unary { operand, .. } => operand.validate(kind, field),
            Expression::Binary { lhs, rhs, .. } => {
                lhs.validate(kind, field)?;
                rhs.validate(kind, field)
            }
            Expression::Call { target, args } => {
                check_qualified_identifier(kind, field, target)?;
                args.iter().try_for_each(|arg| arg.validate(kind, field))
            }
            Expression::FieldAccess { target, field: name } => {
                target.validate(kind, field)?;
                check_identifier(kind, field, name)
            }
            Expression::Index { target, index } => {
                target.validate(kind, field)?;
                index.validate(kind, field)
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => f.write_str(name),
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Unary { op, operand } => {
                f.write_str(op.as_str())?;
                // `-5` is the literal, `-(5)` the negation
                let glued = *op == UnaryOp::Neg && operand.starts_with_number();
                write_operand(f, operand, glued || operand.precedence() < UNARY_PRECEDENCE)
            }
            Expression::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                write_operand(f, lhs, lhs.precedence() < prec)?;
                write!(f, " {} ", op.as_str())?;
                write_operand(f, rhs, rhs.precedence() <= prec)
            }
            Expression::Call { target, args } => {
                write!(f, "{}(", target)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expression::FieldAccess { target, field } => {
                write_operand(f, target, target.precedence() < POSTFIX_PRECEDENCE)?;
                write!(f, ".{}", field)
            }
            Expression::Index { target, index } => {
                write_operand(f, target, target.precedence() < POSTFIX_PRECEDENCE)?;
                write!(f, "[{}]", index)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expression, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{}", value),
            // Debug keeps the fractional part ("1.0"), so the text re-parses as a float
            Literal::Float(value) => write!(f, "{:?}", value),
            Literal::String(value) => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")
            }
            Literal::Boolean(value) => write!(f, "{}", value),
            Literal::Null => f.write_str("null"),
        }
    }
}

/// Reserved words that can never be identifiers.
pub const KEYWORDS: &[&str] = &[
    "break", "catch", "continue", "else", "false", "function", "if", "null", "package", "reply",
    "return", "throw", "true", "try", "while",
];

/// `[A-Za-z_][A-Za-z0-9_]*`, not a keyword.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !KEYWORDS.contains(&name)
}

/// An identifier with an optional `pkg:` qualifier.
pub fn is_qualified_identifier(name: &str) -> bool {
    match name.split_once(':') {
        Some((package, local)) => is_identifier(package) && is_identifier(local),
        None => is_identifier(name),
    }
}

/// A (possibly qualified) type name with zero or more `[]` suffixes.
pub fn is_type_name(name: &str) -> bool {
    let mut base = name;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
    }
    is_qualified_identifier(base)
}

pub(crate) fn check_identifier(
    kind: NodeKind,
    field: &'static str,
    value: &str,
) -> Result<(), MalformedNodeError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(invalid_identifier(kind, field, value))
    }
}

pub(crate) fn check_qualified_identifier(
    kind: NodeKind,
    field: &'static str,
    value: &str,
) -> Result<(), MalformedNodeError> {
    if is_qualified_identifier(value) {
        Ok(())
    } else {
        Err(invalid_identifier(kind, field, value))
    }
}

pub(crate) fn check_type_name(
    kind: NodeKind,
    field: &'static str,
    value: &str,
) -> Result<(), MalformedNodeError> {
    if is_type_name(value) {
        Ok(())
    } else {
        Err(invalid_identifier(kind, field, value))
    }
}

fn invalid_identifier(kind: NodeKind, field: &'static str, value: &str) -> MalformedNodeError {
    MalformedNodeError::InvalidIdentifier {
        kind,
        field,
        value: value.to_string(),
    }
}
