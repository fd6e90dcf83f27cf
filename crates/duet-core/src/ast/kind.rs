// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node kind tags and the child layout rules keyed on them.
//!
//! Dispatch, layout validation and rendering all key on [`NodeKind`], never
//! on the shape of a payload. The table below is what the mutation API
//! enforces:
//!
//! | parent              | children                                        |
//! |---------------------|-------------------------------------------------|
//! | `CompilationUnit`   | `Function`, `Comment`                           |
//! | `Function`, `Block`, `While`, `ElseIf`, `Else`, `Catch` | statements  |
//! | `If`                | statements, then `ElseIf`*, then one `Else`     |
//! | `TryCatch`          | statements, then one `Catch`                    |
//! | everything else     | nothing                                         |

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::error::StructuralEditError;

/// The concrete kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
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
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [NodeKind; 18] = [
        NodeKind::CompilationUnit,
        NodeKind::Function,
        NodeKind::Block,
        NodeKind::If,
        NodeKind::ElseIf,
        NodeKind::Else,
        NodeKind::While,
        NodeKind::Assignment,
        NodeKind::VariableDefinition,
        NodeKind::ExpressionStatement,
        NodeKind::Return,
        NodeKind::Reply,
        NodeKind::Break,
        NodeKind::Continue,
        NodeKind::Throw,
        NodeKind::TryCatch,
        NodeKind::Catch,
        NodeKind::Comment,
    ];

    /// Returns the string representation used in output and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation_unit",
            NodeKind::Function => "function",
            NodeKind::Block => "block",
            NodeKind::If => "if",
            NodeKind::ElseIf => "else_if",
            NodeKind::Else => "else",
            NodeKind::While => "while",
            NodeKind::Assignment => "assignment",
            NodeKind::VariableDefinition => "variable_definition",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::Return => "return",
            NodeKind::Reply => "reply",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::Throw => "throw",
            NodeKind::TryCatch => "try_catch",
            NodeKind::Catch => "catch",
            NodeKind::Comment => "comment",
        }
    }

    /// Parse the output/configuration name of a kind.
    pub fn parse(name: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// True for kinds that may appear in a statement list.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block
                | NodeKind::If
                | NodeKind::While
                | NodeKind::Assignment
                | NodeKind::VariableDefinition
                | NodeKind::ExpressionStatement
                | NodeKind::Return
                | NodeKind::Reply
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Throw
                | NodeKind::TryCatch
                | NodeKind::Comment
        )
    }

    /// True for clauses that only exist under an `If` or `TryCatch`.
    pub fn is_clause(&self) -> bool {
        matches!(self, NodeKind::ElseIf | NodeKind::Else | NodeKind::Catch)
    }

    /// True for kinds that own a statement list.
    pub fn has_body(&self) -> bool {
        matches!(
            self,
            NodeKind::Function
                | NodeKind::Block
                | NodeKind::If
                | NodeKind::ElseIf
                | NodeKind::Else
                | NodeKind::While
                | NodeKind::TryCatch
                | NodeKind::Catch
        )
    }

    /// True for statements after which nothing in the same body can run.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            NodeKind::Return
                | NodeKind::Reply
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Throw
        )
    }

    /// True for the conditional family (`If`, `ElseIf`, `While`).
    pub fn is_conditional(&self) -> bool {
        matches!(self, NodeKind::If | NodeKind::ElseIf | NodeKind::While)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::parse(s).ok_or_else(|| format!("unknown node kind '{}'", s))
    }
}

/// Check that `children` is a valid child layout for a `parent_kind` node.
///
/// Called by every mutation with the child list the edit *would* produce, so
/// an edit is rejected before anything changes.
pub(crate) fn check_layout(
    parent: NodeId,
    parent_kind: NodeKind,
    children: &[NodeKind],
) -> Result<(), StructuralEditError> {
    let not_allowed = |child_kind| StructuralEditError::ChildNotAllowed {
        parent,
        parent_kind,
        child_kind,
    };
    let order = |reason| StructuralEditError::ChildOrder {
        parent,
        parent_kind,
        reason,
    };

    match parent_kind {
        NodeKind::CompilationUnit => {
            for &child in children {
                if !matches!(child, NodeKind::Function | NodeKind::Comment) {
                    return Err(not_allowed(child));
                }
            }
            Ok(())
        }
        NodeKind::If => {
            // 0: statements, 1: else-if clauses, 2: else clause
            let mut phase = 0;
            for &child in children {
                match child {
                    NodeKind::ElseIf if phase <= 1 => phase = 1,
                    NodeKind::ElseIf => {
                        return Err(order("an else-if clause cannot follow the else clause"))
                    }
                    NodeKind::Else if phase < 2 => phase = 2,
                    NodeKind::Else => return Err(order("if statement already has an else clause")),
                    kind if kind.is_statement() => {
                        if phase > 0 {
                            return Err(order("statements must precede else-if and else clauses"));
                        }
                    }
                    kind => return Err(not_allowed(kind)),
                }
            }
            Ok(())
        }
        NodeKind::TryCatch => {
            let mut seen_catch = false;
            for &child in children {
                match child {
                    NodeKind::Catch if seen_catch => {
                        return Err(order("try-catch already has a catch clause"))
                    }
                    NodeKind::Catch => seen_catch = true,
                    kind if kind.is_statement() => {
                        if seen_catch {
                            return Err(order("statements must precede the catch clause"));
                        }
                    }
                    kind => return Err(not_allowed(kind)),
                }
            }
            Ok(())
        }
        kind if kind.has_body() => {
            for &child in children {
                if !child.is_statement() {
                    return Err(not_allowed(child));
                }
            }
            Ok(())
        }
        _ => match children.first() {
            Some(&child) => Err(not_allowed(child)),
            None => Ok(()),
        },
    }
}
