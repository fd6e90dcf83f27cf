// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait definitions for AST traversal.

use crate::ast::{
    Assignment, Block, Break, Catch, Comment, CompilationUnit, Continue, Else, ElseIf,
    ExpressionStatement, Function, If, NodeRef, Reply, Return, Throw, TryCatch,
    VariableDefinition, While,
};
use crate::error::UnsupportedNodeKindError;

/// Result of visiting a node: whether the walker descends into its children.
///
/// Not descending is ordinary control flow, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    ///
    /// After visiting children, `leave_*` will be called for this node.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    ///
    /// The walker will not descend into this node's children, but `leave_*`
    /// will still be called for this node.
    SkipChildren,
}

impl VisitResult {
    pub fn descends(self) -> bool {
        self == VisitResult::Continue
    }
}

/// `true` means "visit my children".
impl From<bool> for VisitResult {
    fn from(descend: bool) -> Self {
        if descend {
            VisitResult::Continue
        } else {
            VisitResult::SkipChildren
        }
    }
}

/// What a `visit_*` handler returns.
pub type VisitOutcome = Result<VisitResult, UnsupportedNodeKindError>;

/// Macro to generate visitor trait method signatures.
///
/// Each entry generates a `visit_*` / `leave_*` pair for one node kind. The
/// defaults fall through to [`Visitor::visit_other`] and
/// [`Visitor::leave_other`].
///
/// ```ignore
/// visitor_methods! {
///     // Generates visit_while_stmt and leave_while_stmt for While
///     while_stmt: While,
/// }
/// ```
macro_rules! visitor_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $payload:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Visit a [`", stringify!($payload), "`] node.")]
                #[doc = ""]
                #[doc = "Called before descending into children. Defaults to `visit_other`."]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, node: NodeRef<'a>, data: &'a $payload) -> VisitOutcome {
                    self.visit_other(node)
                }

                $(#[$meta])*
                #[doc = concat!("Leave a [`", stringify!($payload), "`] node.")]
                #[doc = ""]
                #[doc = "Called after the children, even if `SkipChildren` was returned. Defaults to `leave_other`."]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, node: NodeRef<'a>, data: &'a $payload) {
                    self.leave_other(node)
                }
            )*
        }
    };
}

/// Read-only AST visitor.
///
/// Implement this trait to run an algorithm over a tree without the tree
/// knowing about it. Each node kind has a `visit_*` / `leave_*` pair that
/// receives the node handle and its typed payload.
///
/// # Traversal Order
///
/// - `visit_*` is called in **pre-order** (before children)
/// - `leave_*` is called in **post-order** (after children)
/// - Children are visited in source order
///
/// # Unhandled kinds
///
/// Every `visit_*` defaults to [`visit_other`](Visitor::visit_other), which
/// fails with [`UnsupportedNodeKindError`]. A visitor that only cares about a
/// few kinds but must accept every kind overrides `visit_other` to return
/// `Ok(VisitResult::Continue)`.
///
/// # Example
///
/// ```
/// use duet_core::ast::{NodeRef, While};
/// use duet_core::visitor::{VisitOutcome, VisitResult, Visitor};
///
/// #[derive(Default)]
/// struct LoopCounter {
///     loops: usize,
/// }
///
/// impl<'a> Visitor<'a> for LoopCounter {
///     fn visit_other(&mut self, _node: NodeRef<'a>) -> VisitOutcome {
///         Ok(VisitResult::Continue)
///     }
///
///     fn visit_while_stmt(&mut self, _node: NodeRef<'a>, _data: &'a While) -> VisitOutcome {
///         self.loops += 1;
///         Ok(VisitResult::Continue)
///     }
/// }
/// ```
pub trait Visitor<'a> {
    /// Fallback for every kind without its own handler.
    fn visit_other(&mut self, node: NodeRef<'a>) -> VisitOutcome {
        Err(UnsupportedNodeKindError::new(
            node.kind(),
            node.id(),
            std::any::type_name::<Self>(),
        ))
    }

    /// Fallback for every kind without its own leave hook.
    #[allow(unused_variables)]
    fn leave_other(&mut self, node: NodeRef<'a>) {}

    visitor_methods! {
        compilation_unit: CompilationUnit,
        function_def: Function,
        block: Block,
        if_stmt: If,
        else_if: ElseIf,
        else_clause: Else,
        while_stmt: While,
        assignment: Assignment,
        variable_def: VariableDefinition,
        expr_stmt: ExpressionStatement,
        return_stmt: Return,
        reply_stmt: Reply,
        break_stmt: Break,
        continue_stmt: Continue,
        throw_stmt: Throw,
        try_catch: TryCatch,
        catch_clause: Catch,
        comment: Comment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_result_from_bool() {
        assert_eq!(VisitResult::from(true), VisitResult::Continue);
        assert_eq!(VisitResult::from(false), VisitResult::SkipChildren);
        assert!(VisitResult::default().descends());
        assert!(!VisitResult::SkipChildren.descends());
    }
}
