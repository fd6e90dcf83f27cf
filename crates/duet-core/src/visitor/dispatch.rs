// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The traversal engine: `accept` and the pre-order walk.

use serde::Serialize;
use tracing::{debug, trace};

use super::traits::{VisitOutcome, VisitResult, Visitor};
use crate::ast::{NodeData, NodeId, NodeRef, Tree};
use crate::error::{ReentrantTraversalError, TraversalError};

/// Counts for one completed traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraversalSummary {
    /// Nodes dispatched to the visitor.
    pub visited: usize,
    /// Subtrees pruned by `SkipChildren`.
    pub skipped: usize,
}

/// Walk the subtree rooted at `node`, pre-order.
///
/// Stops at the first failing handler; nodes already visited stay visited.
pub fn walk<'a, V>(visitor: &mut V, node: NodeRef<'a>) -> Result<TraversalSummary, TraversalError>
where
    V: Visitor<'a> + ?Sized,
{
    debug!(root = %node.id(), kind = %node.kind(), "traversal started");
    let mut summary = TraversalSummary::default();
    walk_node(visitor, node, &mut summary)?;
    debug!(
        root = %node.id(),
        visited = summary.visited,
        skipped = summary.skipped,
        "traversal finished"
    );
    Ok(summary)
}

fn walk_node<'a, V>(
    visitor: &mut V,
    node: NodeRef<'a>,
    summary: &mut TraversalSummary,
) -> Result<(), TraversalError>
where
    V: Visitor<'a> + ?Sized,
{
    let _guard = ActiveGuard::enter(node)?;
    summary.visited += 1;

    match dispatch_visit(visitor, node)? {
        VisitResult::Continue => {
            for child in node.children() {
                walk_node(visitor, child, summary)?;
            }
        }
        VisitResult::SkipChildren => {
            summary.skipped += 1;
            trace!(id = %node.id(), kind = %node.kind(), "skipped children");
        }
    }

    dispatch_leave(visitor, node);
    Ok(())
}

fn dispatch_visit<'a, V>(visitor: &mut V, node: NodeRef<'a>) -> VisitOutcome
where
    V: Visitor<'a> + ?Sized,
{
    match node.data() {
        NodeData::CompilationUnit(data) => visitor.visit_compilation_unit(node, data),
        NodeData::Function(data) => visitor.visit_function_def(node, data),
        NodeData::Block(data) => visitor.visit_block(node, data),
        NodeData::If(data) => visitor.visit_if_stmt(node, data),
        NodeData::ElseIf(data) => visitor.visit_else_if(node, data),
        NodeData::Else(data) => visitor.visit_else_clause(node, data),
        NodeData::While(data) => visitor.visit_while_stmt(node, data),
        NodeData::Assignment(data) => visitor.visit_assignment(node, data),
        NodeData::VariableDefinition(data) => visitor.visit_variable_def(node, data),
        NodeData::ExpressionStatement(data) => visitor.visit_expr_stmt(node, data),
        NodeData::Return(data) => visitor.visit_return_stmt(node, data),
        NodeData::Reply(data) => visitor.visit_reply_stmt(node, data),
        NodeData::Break(data) => visitor.visit_break_stmt(node, data),
        NodeData::Continue(data) => visitor.visit_continue_stmt(node, data),
        NodeData::Throw(data) => visitor.visit_throw_stmt(node, data),
        NodeData::TryCatch(data) => visitor.visit_try_catch(node, data),
        NodeData::Catch(data) => visitor.visit_catch_clause(node, data),
        NodeData::Comment(data) => visitor.visit_comment(node, data),
    }
}

fn dispatch_leave<'a, V>(visitor: &mut V, node: NodeRef<'a>)
where
    V: Visitor<'a> + ?Sized,
{
    match node.data() {
        NodeData::CompilationUnit(data) => visitor.leave_compilation_unit(node, data),
        NodeData::Function(data) => visitor.leave_function_def(node, data),
        NodeData::Block(data) => visitor.leave_block(node, data),
        NodeData::If(data) => visitor.leave_if_stmt(node, data),
        NodeData::ElseIf(data) => visitor.leave_else_if(node, data),
        NodeData::Else(data) => visitor.leave_else_clause(node, data),
        NodeData::While(data) => visitor.leave_while_stmt(node, data),
        NodeData::Assignment(data) => visitor.leave_assignment(node, data),
        NodeData::VariableDefinition(data) => visitor.leave_variable_def(node, data),
        NodeData::ExpressionStatement(data) => visitor.leave_expr_stmt(node, data),
        NodeData::Return(data) => visitor.leave_return_stmt(node, data),
        NodeData::Reply(data) => visitor.leave_reply_stmt(node, data),
        NodeData::Break(data) => visitor.leave_break_stmt(node, data),
        NodeData::Continue(data) => visitor.leave_continue_stmt(node, data),
        NodeData::Throw(data) => visitor.leave_throw_stmt(node, data),
        NodeData::TryCatch(data) => visitor.leave_try_catch(node, data),
        NodeData::Catch(data) => visitor.leave_catch_clause(node, data),
        NodeData::Comment(data) => visitor.leave_comment(node, data),
    }
}

/// Marks a node as being visited for as long as the guard lives.
struct ActiveGuard<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> ActiveGuard<'a> {
    fn enter(node: NodeRef<'a>) -> Result<Self, ReentrantTraversalError> {
        let tree = node.tree();
        let id = node.id();
        if !tree.active.borrow_mut().insert(id) {
            return Err(ReentrantTraversalError { id });
        }
        Ok(Self { tree, id })
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.tree.active.borrow_mut().remove(&self.id);
    }
}

impl<'a> NodeRef<'a> {
    /// Run `visitor` over this node and its subtree.
    pub fn accept<V>(self, visitor: &mut V) -> Result<TraversalSummary, TraversalError>
    where
        V: Visitor<'a> + ?Sized,
    {
        walk(visitor, self)
    }
}

impl Tree {
    /// Run `visitor` over the subtree rooted at `id`.
    pub fn accept<'a, V>(
        &'a self,
        id: NodeId,
        visitor: &mut V,
    ) -> Result<TraversalSummary, TraversalError>
    where
        V: Visitor<'a> + ?Sized,
    {
        walk(visitor, self.node(id)?)
    }
}
