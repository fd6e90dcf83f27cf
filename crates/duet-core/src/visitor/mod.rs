// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor infrastructure for AST traversal.
//!
//! Algorithms (renderers, generators, linters) implement [`Visitor`] and are
//! run with `accept`. The tree never knows which algorithms exist.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order
//! - Expressions are attributes of their node and are never visited
//!
//! # Control Flow
//!
//! A handler returns [`VisitResult::Continue`] to descend or
//! [`VisitResult::SkipChildren`] to prune the subtree. There is no global
//! stop; wrap the visitor in [`Cancellable`] for a soft abort.
//!
//! # Re-entrancy
//!
//! Calling `accept` on a node that an active traversal is currently visiting
//! fails with [`ReentrantTraversalError`](crate::error::ReentrantTraversalError).
//! Starting a fresh traversal on some other node from inside a handler is
//! fine.

mod cancel;
mod collect;
mod dispatch;
mod traits;

pub use cancel::{CancelToken, Cancellable};
pub use collect::PreorderCollector;
pub use dispatch::{walk, TraversalSummary};
pub use traits::{VisitOutcome, VisitResult, Visitor};
