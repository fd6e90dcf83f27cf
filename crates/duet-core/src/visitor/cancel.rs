// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Soft abort on top of the skip signal.
//!
//! There is no global stop in the visitor protocol. A visitor that wants to
//! end a traversal early is wrapped in [`Cancellable`]; once its
//! [`CancelToken`] is cancelled, every remaining handler answers
//! `SkipChildren` without calling the wrapped visitor, so the walk unwinds
//! after touching at most the siblings of the nodes on the current path.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use super::traits::{VisitOutcome, VisitResult, Visitor};
use crate::ast::{
    Assignment, Block, Break, Catch, Comment, CompilationUnit, Continue, Else, ElseIf,
    ExpressionStatement, Function, If, NodeId, NodeRef, Reply, Return, Throw, TryCatch,
    VariableDefinition, While,
};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Wraps a visitor so a [`CancelToken`] can cut the traversal short.
///
/// `leave_*` is forwarded exactly for the nodes whose `visit_*` was
/// forwarded and succeeded, so the wrapped visitor always sees balanced
/// pairs. Entries left behind by a failed walk are dropped when the next
/// walk reaches a node they are not the parent of.
#[derive(Debug)]
pub struct Cancellable<V> {
    inner: V,
    token: CancelToken,
    forwarded: Vec<(NodeId, bool)>,
}

impl<V> Cancellable<V> {
    pub fn new(inner: V, token: CancelToken) -> Self {
        Self {
            inner,
            token,
            forwarded: Vec::new(),
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut V {
        &mut self.inner
    }

    pub fn into_inner(self) -> V {
        self.inner
    }

    /// Drop entries that do not belong to the path leading to `node`.
    fn unwind_to_parent(&mut self, node: NodeRef<'_>) {
        let parent = node.parent().map(|p| p.id());
        while let Some(&(id, _)) = self.forwarded.last() {
            if Some(id) == parent {
                break;
            }
            self.forwarded.pop();
        }
    }

    fn leave_forwarded(&mut self, node: NodeRef<'_>) -> bool {
        matches!(self.forwarded.last(), Some(&(id, _)) if id == node.id())
            && matches!(self.forwarded.pop(), Some((_, true)))
    }
}

macro_rules! forward_methods {
    (
        $(
            $base_name:ident : $payload:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                fn [<visit_ $base_name>](&mut self, node: NodeRef<'a>, data: &'a $payload) -> VisitOutcome {
                    self.unwind_to_parent(node);
                    if self.token.is_cancelled() {
                        trace!(id = %node.id(), "cancelled, skipping");
                        self.forwarded.push((node.id(), false));
                        return Ok(VisitResult::SkipChildren);
                    }
                    let result = self.inner.[<visit_ $base_name>](node, data)?;
                    self.forwarded.push((node.id(), true));
                    Ok(result)
                }

                fn [<leave_ $base_name>](&mut self, node: NodeRef<'a>, data: &'a $payload) {
                    if self.leave_forwarded(node) {
                        self.inner.[<leave_ $base_name>](node, data);
                    }
                }
            )*
        }
    };
}

impl<'a, V> Visitor<'a> for Cancellable<V>
where
    V: Visitor<'a>,
{
    forward_methods! {
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
    use crate::ast::{Expression, NodeKind, Tree};

    /// Cancels its token on the first `Break` it sees.
    struct StopAtBreak {
        token: CancelToken,
        visited: Vec<NodeKind>,
        left: Vec<NodeKind>,
    }

    impl<'a> Visitor<'a> for StopAtBreak {
        fn visit_other(&mut self, node: NodeRef<'a>) -> VisitOutcome {
            self.visited.push(node.kind());
            Ok(VisitResult::Continue)
        }

        fn leave_other(&mut self, node: NodeRef<'a>) {
            self.left.push(node.kind());
        }

        fn visit_break_stmt(&mut self, node: NodeRef<'a>, _data: &'a Break) -> VisitOutcome {
            self.token.cancel();
            self.visit_other(node)
        }
    }

    #[test]
    fn test_cancel_skips_everything_after() {
        let mut tree = Tree::default();
        let f = tree.create(Function::new("main", vec![], vec![]).unwrap());
        let w = tree.create(While::new(Expression::boolean(true)).unwrap());
        let b = tree.create(Break);
        let after = tree.create(Return::default());
        let later = tree.create(Function::new("other", vec![], vec![]).unwrap());
        let inner = tree.create(Return::default());
        let root = tree.root_id();
        tree.append_child(root, f).unwrap();
        tree.append_child(f, w).unwrap();
        tree.append_child(w, b).unwrap();
        tree.append_child(f, after).unwrap();
        tree.append_child(root, later).unwrap();
        tree.append_child(later, inner).unwrap();

        let token = CancelToken::new();
        let mut visitor = Cancellable::new(
            StopAtBreak {
                token: token.clone(),
                visited: Vec::new(),
                left: Vec::new(),
            },
            token.clone(),
        );
        let summary = tree.root().accept(&mut visitor).unwrap();
        assert!(token.is_cancelled());

        let inner = visitor.into_inner();
        assert_eq!(
            inner.visited,
            vec![
                NodeKind::CompilationUnit,
                NodeKind::Function,
                NodeKind::While,
                NodeKind::Break
            ]
        );
        // Balanced leaves for everything that was forwarded.
        assert_eq!(
            inner.left,
            vec![
                NodeKind::Break,
                NodeKind::While,
                NodeKind::Function,
                NodeKind::CompilationUnit
            ]
        );
        // `after` and `later` are dispatched and pruned; `inner` never is.
        assert_eq!(summary.visited, 6);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_uncancelled_wrapper_is_transparent() {
        let mut tree = Tree::default();
        let f = tree.create(Function::new("main", vec![], vec![]).unwrap());
        let root = tree.root_id();
        tree.append_child(root, f).unwrap();

        let token = CancelToken::new();
        let mut visitor = Cancellable::new(
            StopAtBreak {
                token: CancelToken::new(),
                visited: Vec::new(),
                left: Vec::new(),
            },
            token,
        );
        tree.root().accept(&mut visitor).unwrap();
        assert_eq!(
            visitor.inner().visited,
            vec![NodeKind::CompilationUnit, NodeKind::Function]
        );
        assert!(!visitor.token().is_cancelled());
    }

    /// Records visits and leaves, and fails on `Return`.
    #[derive(Default)]
    struct FailOnReturn {
        visited: Vec<NodeKind>,
        left: Vec<NodeKind>,
    }

    impl<'a> Visitor<'a> for FailOnReturn {
        fn visit_other(&mut self, node: NodeRef<'a>) -> VisitOutcome {
            self.visited.push(node.kind());
            Ok(VisitResult::Continue)
        }

        fn leave_other(&mut self, node: NodeRef<'a>) {
            self.left.push(node.kind());
        }

        fn visit_return_stmt(&mut self, node: NodeRef<'a>, _data: &'a Return) -> VisitOutcome {
            Err(crate::error::UnsupportedNodeKindError::new(
                node.kind(),
                node.id(),
                "FailOnReturn",
            ))
        }
    }

    #[test]
    fn test_failed_walk_leaves_no_stale_entries() {
        let mut failing = Tree::default();
        let f = failing.create(Function::new("main", vec![], vec![]).unwrap());
        let r = failing.create(Return::default());
        let root = failing.root_id();
        failing.append_child(root, f).unwrap();
        failing.append_child(f, r).unwrap();

        let mut visitor = Cancellable::new(FailOnReturn::default(), CancelToken::new());
        assert!(failing.root().accept(&mut visitor).is_err());
        assert!(visitor.forwarded.iter().all(|(id, _)| *id != r));

        let mut clean = Tree::default();
        let g = clean.create(Function::new("g", vec![], vec![]).unwrap());
        let b = clean.create(Block);
        let root = clean.root_id();
        clean.append_child(root, g).unwrap();
        clean.append_child(g, b).unwrap();

        visitor.inner_mut().visited.clear();
        visitor.inner_mut().left.clear();
        clean.root().accept(&mut visitor).unwrap();
        assert!(visitor.forwarded.is_empty());
        assert_eq!(
            visitor.inner().left,
            vec![NodeKind::Block, NodeKind::Function, NodeKind::CompilationUnit]
        );
    }
}
