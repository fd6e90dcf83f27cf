// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! AST core for the duet visual/source editor.
//!
//! This crate provides the shared in-memory program representation:
//! - Node model: kinds, typed payloads, attribute expressions
//! - Arena-backed tree with stable generational ids
//! - Visitor double dispatch and the pre-order traversal engine
//! - Mutation API with layout validation and change notifications
//! - Error types
//!
//! # Quick Start
//!
//! ```
//! use duet_core::ast::{Break, Expression, Function, Tree, While};
//! use duet_core::visitor::PreorderCollector;
//!
//! let mut tree = Tree::default();
//! let main = tree.create(Function::new("main", vec![], vec![]).unwrap());
//! let loop_ = tree.create(While::new(Expression::boolean(true)).unwrap());
//! let stop = tree.create(Break);
//! tree.append_child(tree.root_id(), main).unwrap();
//! tree.append_child(main, loop_).unwrap();
//! tree.append_child(loop_, stop).unwrap();
//!
//! let ids = PreorderCollector::collect(tree.root()).unwrap();
//! assert_eq!(ids, vec![tree.root_id(), main, loop_, stop]);
//! ```

pub mod ast;
mod edit;
pub mod error;
pub mod events;
pub mod visitor;

pub use ast::{NodeData, NodeId, NodeKind, NodeRef, Tree};
pub use error::{
    MalformedNodeError, ReentrantTraversalError, StructuralEditError, TraversalError,
    UnknownNodeError, UnsupportedNodeKindError,
};
pub use events::{ChangeKind, StructuralChange, SubscriptionHandle};
pub use visitor::{
    CancelToken, Cancellable, TraversalSummary, VisitOutcome, VisitResult, Visitor,
};
