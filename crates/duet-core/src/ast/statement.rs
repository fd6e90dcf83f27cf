// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Typed node payloads.
//!
//! A payload holds a node's *attributes*: names, types and expressions. It
//! never holds child nodes. Statement lists live in the tree's generic child
//! list and are read through [`NodeRef::statements`](super::NodeRef::statements)
//! and friends, so generic edits and named accessors can never disagree.
//!
//! Constructors validate eagerly and fail with [`MalformedNodeError`]. Fields
//! are private, so a payload that exists is a valid payload.
//!
//! # Conditional shape
//!
//! `If`, `ElseIf` and `While` share one layout, [`Conditional`], composed
//! into each kind and exposed through the [`ConditionalStatement`] capability.
//! The shared shape only deduplicates fields; dispatch is always by
//! [`NodeKind`].

use serde::Serialize;

use super::expression::{check_identifier, check_type_name, Expression};
use super::NodeKind;
use crate::error::MalformedNodeError;

fn require(
    kind: NodeKind,
    field: &'static str,
    value: Option<Expression>,
) -> Result<Expression, MalformedNodeError> {
    let value = value.ok_or(MalformedNodeError::MissingField { kind, field })?;
    value.validate(kind, field)?;
    Ok(value)
}

// ============================================================================
// Containers
// ============================================================================

/// The root of a source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompilationUnit {
    package: Option<String>,
}

impl CompilationUnit {
    /// `package` is a dotted name such as `samples.echo`.
    pub fn new(package: Option<String>) -> Result<Self, MalformedNodeError> {
        if let Some(name) = &package {
            if name.is_empty() || !name.split('.').all(super::is_identifier) {
                return Err(MalformedNodeError::InvalidIdentifier {
                    kind: NodeKind::CompilationUnit,
                    field: "package",
                    value: name.clone(),
                });
            }
        }
        Ok(Self { package })
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }
}

/// A typed function parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    type_name: String,
    name: String,
}

impl Parameter {
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, MalformedNodeError> {
        let type_name = type_name.into();
        let name = name.into();
        check_type_name(NodeKind::Function, "parameter type", &type_name)?;
        check_identifier(NodeKind::Function, "parameter name", &name)?;
        Ok(Self { type_name, name })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A function definition. Its children are the body statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    name: String,
    params: Vec<Parameter>,
    return_types: Vec<String>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Parameter>,
        return_types: Vec<String>,
    ) -> Result<Self, MalformedNodeError> {
        let name = name.into();
        check_identifier(NodeKind::Function, "name", &name)?;
        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.name == param.name) {
                return Err(MalformedNodeError::InvalidField {
                    kind: NodeKind::Function,
                    field: "params",
                    reason: format!("declares parameter '{}' twice", param.name),
                });
            }
        }
        for return_type in &return_types {
            check_type_name(NodeKind::Function, "return type", return_type)?;
        }
        Ok(Self {
            name,
            params,
            return_types,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn return_types(&self) -> &[String] {
        &self.return_types
    }
}

/// A nested `{ ... }` statement block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block;

// ============================================================================
// Conditional family
// ============================================================================

/// The layout shared by `If`, `ElseIf` and `While`: a required condition.
/// The statement list is the node's children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditional {
    condition: Expression,
}

impl Conditional {
    /// Fails with [`MalformedNodeError::MissingField`] when `condition` is
    /// absent. Conditions come from diagram forms, which may be unfilled.
    pub fn new(kind: NodeKind, condition: Option<Expression>) -> Result<Self, MalformedNodeError> {
        Ok(Self {
            condition: require(kind, "condition", condition)?,
        })
    }

    pub fn condition(&self) -> &Expression {
        &self.condition
    }
}

/// Capability of the conditional family.
pub trait ConditionalStatement {
    fn conditional(&self) -> &Conditional;

    fn condition(&self) -> &Expression {
        self.conditional().condition()
    }
}

/// `if (condition) { ... }`. Children: body statements, then `ElseIf`
/// clauses, then at most one `Else`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct If {
    #[serde(flatten)]
    conditional: Conditional,
}

impl If {
    pub fn new(condition: impl Into<Option<Expression>>) -> Result<Self, MalformedNodeError> {
        Ok(Self {
            conditional: Conditional::new(NodeKind::If, condition.into())?,
        })
    }
}

/// `else if (condition) { ... }`, a clause of an `If`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIf {
    #[serde(flatten)]
    conditional: Conditional,
}

impl ElseIf {
    pub fn new(condition: impl Into<Option<Expression>>) -> Result<Self, MalformedNodeError> {
        Ok(Self {
            conditional: Conditional::new(NodeKind::ElseIf, condition.into())?,
        })
    }
}

/// `else { ... }`, the final clause of an `If`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Else;

/// `while (condition) { ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct While {
    #[serde(flatten)]
    conditional: Conditional,
}

impl While {
    pub fn new(condition: impl Into<Option<Expression>>) -> Result<Self, MalformedNodeError> {
        Ok(Self {
            conditional: Conditional::new(NodeKind::While, condition.into())?,
        })
    }
}

impl ConditionalStatement for If {
    fn conditional(&self) -> &Conditional {
        &self.conditional
    }
}

impl ConditionalStatement for ElseIf {
    fn conditional(&self) -> &Conditional {
        &self.conditional
    }
}

impl ConditionalStatement for While {
    fn conditional(&self) -> &Conditional {
        &self.conditional
    }
}

// ============================================================================
// Simple statements
// ============================================================================

/// `target = value;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    target: Expression,
    value: Expression,
}

impl Assignment {
    pub fn new(
        target: impl Into<Option<Expression>>,
        value: impl Into<Option<Expression>>,
    ) -> Result<Self, MalformedNodeError> {
        let target = require(NodeKind::Assignment, "target", target.into())?;
        if !target.is_assignable() {
            return Err(MalformedNodeError::InvalidField {
                kind: NodeKind::Assignment,
                field: "target",
                reason: format!("is not assignable: {}", target),
            });
        }
        let value = require(NodeKind::Assignment, "value", value.into())?;
        Ok(Self { target, value })
    }

    pub fn target(&self) -> &Expression {
        &self.target
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }
}

/// `type name = initializer;` (initializer optional).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDefinition {
    type_name: String,
    name: String,
    initializer: Option<Expression>,
}

impl VariableDefinition {
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        initializer: Option<Expression>,
    ) -> Result<Self, MalformedNodeError> {
        let type_name = type_name.into();
        let name = name.into();
        check_type_name(NodeKind::VariableDefinition, "type", &type_name)?;
        check_identifier(NodeKind::VariableDefinition, "name", &name)?;
        if let Some(init) = &initializer {
            init.validate(NodeKind::VariableDefinition, "initializer")?;
        }
        Ok(Self {
            type_name,
            name,
            initializer,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initializer(&self) -> Option<&Expression> {
        self.initializer.as_ref()
    }
}

/// A function invocation used as a statement: `log(x);`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionStatement {
    expression: Expression,
}

impl ExpressionStatement {
    pub fn new(expression: impl Into<Option<Expression>>) -> Result<Self, MalformedNodeError> {
        let expression = require(NodeKind::ExpressionStatement, "expression", expression.into())?;
        if !expression.is_call() {
            return Err(MalformedNodeError::InvalidField {
                kind: NodeKind::ExpressionStatement,
                field: "expression",
                reason: format!("must be a function invocation, found {}", expression),
            });
        }
        Ok(Self { expression })
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

/// `return a, b;` (zero or more values).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Return {
    values: Vec<Expression>,
}

impl Return {
    pub fn new(values: Vec<Expression>) -> Result<Self, MalformedNodeError> {
        for value in &values {
            value.validate(NodeKind::Return, "values")?;
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[Expression] {
        &self.values
    }
}

/// `reply message;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    value: Expression,
}

impl Reply {
    pub fn new(value: impl Into<Option<Expression>>) -> Result<Self, MalformedNodeError> {
        Ok(Self {
            value: require(NodeKind::Reply, "value", value.into())?,
        })
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }
}

/// `break;`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Break;

/// `continue;`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Continue;

/// `throw error;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Throw {
    value: Expression,
}

impl Throw {
    pub fn new(value: impl Into<Option<Expression>>) -> Result<Self, MalformedNodeError> {
        Ok(Self {
            value: require(NodeKind::Throw, "value", value.into())?,
        })
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }
}

/// `try { ... } catch (...) { ... }`. Children: body statements, then at most
/// one `Catch` clause.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TryCatch;

/// `catch (type variable) { ... }`, the clause of a `TryCatch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catch {
    type_name: String,
    variable: String,
}

impl Catch {
    pub fn new(
        type_name: impl Into<String>,
        variable: impl Into<String>,
    ) -> Result<Self, MalformedNodeError> {
        let type_name = type_name.into();
        let variable = variable.into();
        check_type_name(NodeKind::Catch, "type", &type_name)?;
        check_identifier(NodeKind::Catch, "variable", &variable)?;
        Ok(Self {
            type_name,
            variable,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }
}

/// `// text`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    text: String,
}

impl Comment {
    /// `text` excludes the `//` marker and must fit on one line. Surrounding
    /// whitespace is dropped.
    pub fn new(text: impl Into<String>) -> Result<Self, MalformedNodeError> {
        let text = text.into();
        if text.contains(['\n', '\r']) {
            return Err(MalformedNodeError::InvalidField {
                kind: NodeKind::Comment,
                field: "text",
                reason: "must not contain a line break".to_string(),
            });
        }
        Ok(Self {
            text: text.trim().to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// NodeData
// ============================================================================

/// The payload of a node, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeData {
    CompilationUnit(CompilationUnit),
    Function(Function),
    Block(Block),
    If(If),
    ElseIf(ElseIf),
    Else(Else),
    While(While),
    Assignment(Assignment),
    VariableDefinition(VariableDefinition),
    ExpressionStatement(ExpressionStatement),
    Return(Return),
    Reply(Reply),
    Break(Break),
    Continue(Continue),
    Throw(Throw),
    TryCatch(TryCatch),
    Catch(Catch),
    Comment(Comment),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::CompilationUnit(_) => NodeKind::CompilationUnit,
            NodeData::Function(_) => NodeKind::Function,
            NodeData::Block(_) => NodeKind::Block,
            NodeData::If(_) => NodeKind::If,
            NodeData::ElseIf(_) => NodeKind::ElseIf,
            NodeData::Else(_) => NodeKind::Else,
            NodeData::While(_) => NodeKind::While,
            NodeData::Assignment(_) => NodeKind::Assignment,
            NodeData::VariableDefinition(_) => NodeKind::VariableDefinition,
            NodeData::ExpressionStatement(_) => NodeKind::ExpressionStatement,
            NodeData::Return(_) => NodeKind::Return,
            NodeData::Reply(_) => NodeKind::Reply,
            NodeData::Break(_) => NodeKind::Break,
            NodeData::Continue(_) => NodeKind::Continue,
            NodeData::Throw(_) => NodeKind::Throw,
            NodeData::TryCatch(_) => NodeKind::TryCatch,
            NodeData::Catch(_) => NodeKind::Catch,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    /// The conditional capability, for `If`, `ElseIf` and `While`.
    pub fn as_conditional(&self) -> Option<&dyn ConditionalStatement> {
        match self {
            NodeData::If(data) => Some(data),
            NodeData::ElseIf(data) => Some(data),
            NodeData::While(data) => Some(data),
            _ => None,
        }
    }
}

macro_rules! node_data_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for NodeData {
                fn from(data: $variant) -> Self {
                    NodeData::$variant(data)
                }
            }
        )*
    };
}

node_data_from!(
    CompilationUnit,
    Function,
    Block,
    If,
    ElseIf,
    Else,
    While,
    Assignment,
    VariableDefinition,
    ExpressionStatement,
    Return,
    Reply,
    Break,
    Continue,
    Throw,
    TryCatch,
    Catch,
    Comment,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn cond() -> Expression {
        Expression::binary(BinaryOp::Lt, Expression::ident("i"), Expression::int(10))
    }

    #[test]
    fn test_conditional_requires_condition() {
        let err = Conditional::new(NodeKind::While, None).unwrap_err();
        assert_eq!(
            err,
            MalformedNodeError::MissingField {
                kind: NodeKind::While,
                field: "condition",
            }
        );

        assert!(matches!(
            If::new(None),
            Err(MalformedNodeError::MissingField { kind: NodeKind::If, .. })
        ));
        assert!(matches!(
            ElseIf::new(None),
            Err(MalformedNodeError::MissingField { kind: NodeKind::ElseIf, .. })
        ));
        assert!(matches!(
            While::new(None),
            Err(MalformedNodeError::MissingField { kind: NodeKind::While, .. })
        ));
    }

    #[test]
    fn test_conditional_capability() {
        let data = NodeData::from(While::new(cond()).unwrap());
        let conditional = data.as_conditional().unwrap();
        assert_eq!(conditional.condition(), &cond());

        assert!(NodeData::from(Break).as_conditional().is_none());
    }

    #[test]
    fn test_assignment_checks() {
        assert!(Assignment::new(Expression::ident("x"), Expression::int(1)).is_ok());
        assert!(matches!(
            Assignment::new(None, Expression::int(1)),
            Err(MalformedNodeError::MissingField { field: "target", .. })
        ));
        assert!(matches!(
            Assignment::new(Expression::ident("x"), None),
            Err(MalformedNodeError::MissingField { field: "value", .. })
        ));
        assert!(matches!(
            Assignment::new(Expression::int(3), Expression::int(1)),
            Err(MalformedNodeError::InvalidField { field: "target", .. })
        ));
    }

    #[test]
    fn test_expression_statement_must_be_call() {
        assert!(ExpressionStatement::new(Expression::call("log", vec![])).is_ok());
        assert!(matches!(
            ExpressionStatement::new(Expression::ident("x")),
            Err(MalformedNodeError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_names_are_checked() {
        assert!(Function::new("main", vec![], vec![]).is_ok());
        assert!(Function::new("", vec![], vec![]).is_err());
        assert!(Function::new("f", vec![], vec!["1int".to_string()]).is_err());
        assert!(VariableDefinition::new("int", "x", Some(Expression::int(0))).is_ok());
        assert!(VariableDefinition::new("int", "if", None).is_err());
        assert!(Parameter::new("message", "m").is_ok());
        assert!(Parameter::new("message", "").is_err());
        assert!(Catch::new("exception", "e").is_ok());
        assert!(Catch::new("exception", "e f").is_err());
        assert!(CompilationUnit::new(Some("samples.echo".to_string())).is_ok());
        assert!(CompilationUnit::new(Some("samples..echo".to_string())).is_err());
    }

    #[test]
    fn test_duplicate_parameters_rejected() {
        let params = vec![
            Parameter::new("int", "a").unwrap(),
            Parameter::new("string", "a").unwrap(),
        ];
        assert!(matches!(
            Function::new("f", params, vec![]),
            Err(MalformedNodeError::InvalidField { field: "params", .. })
        ));
    }

    #[test]
    fn test_comment_single_line() {
        assert_eq!(Comment::new("hello").unwrap().text(), "hello");
        assert!(Comment::new("a\nb").is_err());
    }

    #[test]
    fn test_comment_drops_surrounding_whitespace() {
        assert_eq!(Comment::new("  padded ").unwrap().text(), "padded");
        assert_eq!(Comment::new("a  b\t").unwrap().text(), "a  b");
        assert_eq!(Comment::new("   ").unwrap().text(), "");
    }

    #[test]
    fn test_data_kind_matches_variant() {
        assert_eq!(NodeData::from(Block).kind(), NodeKind::Block);
        assert_eq!(NodeData::from(TryCatch).kind(), NodeKind::TryCatch);
        assert_eq!(
            NodeData::from(Reply::new(Expression::ident("m")).unwrap()).kind(),
            NodeKind::Reply
        );
    }
}
