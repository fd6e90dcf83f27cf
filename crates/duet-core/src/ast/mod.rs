// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The node model.
//!
//! - [`NodeKind`]: the closed set of node kinds and their child layout rules
//! - [`NodeData`]: typed per-kind payloads (attributes only)
//! - [`Expression`]: attribute-level expressions, never nodes
//! - [`Tree`] / [`NodeRef`]: arena storage and borrowed navigation

mod expression;
mod ids;
mod kind;
mod statement;
mod tree;

pub use expression::{
    is_identifier, is_qualified_identifier, is_type_name, BinaryOp, Expression, Literal, UnaryOp,
    KEYWORDS,
};
pub use ids::NodeId;
pub(crate) use kind::check_layout;
pub use kind::NodeKind;
pub use statement::{
    Assignment, Block, Break, Catch, Comment, CompilationUnit, Conditional, ConditionalStatement,
    Continue, Else, ElseIf, ExpressionStatement, Function, If, NodeData, Parameter, Reply, Return,
    Throw, TryCatch, VariableDefinition, While,
};
pub use tree::{NodeRef, NodeSnapshot, Tree};
