// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the AST core.
//!
//! Every error here is synchronous and returned to the immediate caller. The
//! core never logs-and-continues and never retries: these are contract
//! violations, and what to show the user is the host's decision.
//!
//! - [`MalformedNodeError`]: a node payload was built from bad input
//! - [`UnsupportedNodeKindError`]: a visitor has no handler for a node kind
//! - [`StructuralEditError`]: a mutation request was invalid (tree unchanged)
//! - [`ReentrantTraversalError`]: `accept` re-entered a node being visited
//! - [`UnknownNodeError`]: an id does not (or no longer) name a live node

use thiserror::Error;

use crate::ast::{NodeId, NodeKind};

/// A node payload could not be constructed.
///
/// Raised by the payload constructors, before the node ever reaches a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedNodeError {
    /// A required field was absent.
    #[error("{kind} is missing required field `{field}`")]
    MissingField {
        kind: NodeKind,
        field: &'static str,
    },

    /// A name field does not hold a valid identifier.
    #[error("{kind}: `{field}` is not a valid identifier: {value:?}")]
    InvalidIdentifier {
        kind: NodeKind,
        field: &'static str,
        value: String,
    },

    /// A field holds a value of the wrong shape.
    #[error("{kind}: `{field}` {reason}")]
    InvalidField {
        kind: NodeKind,
        field: &'static str,
        reason: String,
    },
}

impl MalformedNodeError {
    /// The node kind whose construction failed.
    pub fn kind(&self) -> NodeKind {
        match self {
            MalformedNodeError::MissingField { kind, .. }
            | MalformedNodeError::InvalidIdentifier { kind, .. }
            | MalformedNodeError::InvalidField { kind, .. } => *kind,
        }
    }
}

/// A visitor was dispatched a node kind it does not handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("visitor {visitor} does not handle {kind} nodes (at {id})")]
pub struct UnsupportedNodeKindError {
    /// Kind of the node that could not be dispatched.
    pub kind: NodeKind,
    /// The node that could not be dispatched.
    pub id: NodeId,
    /// Type name of the visitor.
    pub visitor: &'static str,
}

impl UnsupportedNodeKindError {
    pub fn new(kind: NodeKind, id: NodeId, visitor: &'static str) -> Self {
        Self { kind, id, visitor }
    }
}

/// `accept` was called on a node that an active traversal is currently visiting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("re-entrant traversal of {id}: node is already being visited")]
pub struct ReentrantTraversalError {
    pub id: NodeId,
}

/// The id does not name a live node of this tree.
///
/// Discarded nodes are gone for good; generational ids are never reused, so a
/// stale id can never alias a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown node {id}")]
pub struct UnknownNodeError {
    pub id: NodeId,
}

/// A structural edit was rejected. The tree is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralEditError {
    /// An id in the request does not name a live node.
    #[error(transparent)]
    UnknownNode(#[from] UnknownNodeError),

    /// The child index is outside the valid range for the operation.
    #[error("index {index} out of bounds for {parent} with {len} children")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    /// The node to insert already has a parent. Use `move_child` to reparent.
    #[error("{node} is already a child of {parent}")]
    AlreadyAttached { node: NodeId, parent: NodeId },

    /// The node must be detached for this operation.
    #[error("{node} is still attached to {parent}")]
    NotDetached { node: NodeId, parent: NodeId },

    /// The tree root cannot be inserted, moved, or discarded.
    #[error("the root node {node} cannot be used in {operation}")]
    RootNode {
        node: NodeId,
        operation: &'static str,
    },

    /// The edit would place a node beneath itself.
    #[error("placing {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },

    /// The parent kind never accepts children of this kind.
    #[error("{parent_kind} {parent} does not accept {child_kind} children")]
    ChildNotAllowed {
        parent: NodeId,
        parent_kind: NodeKind,
        child_kind: NodeKind,
    },

    /// The child kind is accepted, but not at this position.
    #[error("{parent_kind} {parent}: {reason}")]
    ChildOrder {
        parent: NodeId,
        parent_kind: NodeKind,
        reason: &'static str,
    },

    /// A payload update tried to change the node kind.
    #[error("cannot update {node}: expected {expected} payload, found {found}")]
    KindMismatch {
        node: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },
}

/// Failure of a traversal started with `accept`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    #[error(transparent)]
    UnsupportedNodeKind(#[from] UnsupportedNodeKindError),

    #[error(transparent)]
    Reentrant(#[from] ReentrantTraversalError),

    #[error(transparent)]
    UnknownNode(#[from] UnknownNodeError),
}
