// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Arena-backed node storage.
//!
//! A [`Tree`] owns every node in a generational arena. Parent links are plain
//! [`NodeId`] back-references, children are ordered `Vec<NodeId>`s, and the
//! two are only ever changed together (see the mutation API in
//! [`crate::edit`]), so `children[i].parent == this` always holds.
//!
//! Nodes are created *detached* (no parent). A detached node can be built up
//! with its own children and then inserted; a removed node is detached again
//! and can be re-inserted elsewhere. Detached subtrees are destroyed with
//! [`Tree::discard`] or [`Tree::sweep`], after which their ids are dead.

use std::cell::RefCell;
use std::collections::HashSet;

use generational_arena::Arena;
use serde::Serialize;
use tracing::trace;

use super::{ConditionalStatement, Expression, NodeData, NodeId, NodeKind};
use crate::error::{StructuralEditError, UnknownNodeError};
use crate::events::Observers;

#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// An AST: one `CompilationUnit` root plus any detached subtrees.
pub struct Tree {
    pub(crate) arena: Arena<Slot>,
    root: NodeId,
    pub(crate) observers: Observers,
    /// Nodes on the stack of an in-progress traversal.
    pub(crate) active: RefCell<HashSet<NodeId>>,
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("len", &self.arena.len())
            .field("subscribers", &self.observers.len())
            .finish()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(super::CompilationUnit::default())
    }
}

impl Tree {
    /// Create a tree whose root is `unit`.
    pub fn new(unit: super::CompilationUnit) -> Self {
        let mut arena = Arena::new();
        let root = NodeId::new(arena.insert(Slot {
            data: NodeData::CompilationUnit(unit),
            parent: None,
            children: Vec::new(),
        }));
        Self {
            arena,
            root,
            observers: Observers::default(),
            active: RefCell::new(HashSet::new()),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root,
        }
    }

    /// Create a detached node. Attach it with `insert_child`.
    pub fn create(&mut self, data: impl Into<NodeData>) -> NodeId {
        let data = data.into();
        let kind = data.kind();
        let id = NodeId::new(self.arena.insert(Slot {
            data,
            parent: None,
            children: Vec::new(),
        }));
        trace!(%id, %kind, "created node");
        id
    }

    /// Look up a live node.
    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_>, UnknownNodeError> {
        if self.arena.contains(id.index()) {
            Ok(NodeRef { tree: self, id })
        } else {
            Err(UnknownNodeError { id })
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.index())
    }

    /// Number of live nodes, attached or detached.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Tops of all detached subtrees.
    pub fn detached(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .arena
            .iter()
            .filter(|(index, slot)| slot.parent.is_none() && NodeId::new(*index) != self.root)
            .map(|(index, _)| NodeId::new(index))
            .collect();
        ids.sort();
        ids
    }

    /// Destroy a detached subtree. Returns the number of nodes freed.
    pub fn discard(&mut self, id: NodeId) -> Result<usize, StructuralEditError> {
        let slot = self.slot(id)?;
        if id == self.root {
            return Err(StructuralEditError::RootNode {
                node: id,
                operation: "discard",
            });
        }
        if let Some(parent) = slot.parent {
            return Err(StructuralEditError::NotDetached { node: id, parent });
        }

        let freed = self.free_subtree(id);
        trace!(%id, freed, "discarded subtree");
        Ok(freed)
    }

    /// Destroy every detached subtree. Returns the number of nodes freed.
    pub fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for id in self.detached() {
            freed += self.free_subtree(id);
        }
        trace!(freed, "swept detached subtrees");
        freed
    }

    fn free_subtree(&mut self, id: NodeId) -> usize {
        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(slot) = self.arena.remove(next.index()) {
                stack.extend(slot.children);
                freed += 1;
            }
        }
        freed
    }

    /// A structural copy of the subtree at `id`, without ids.
    ///
    /// Two snapshots compare equal exactly when the subtrees have the same
    /// shape and payloads.
    pub fn snapshot(&self, id: NodeId) -> Result<NodeSnapshot, UnknownNodeError> {
        Ok(self.node(id)?.snapshot())
    }

    pub(crate) fn slot(&self, id: NodeId) -> Result<&Slot, UnknownNodeError> {
        self.arena.get(id.index()).ok_or(UnknownNodeError { id })
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, UnknownNodeError> {
        self.arena.get_mut(id.index()).ok_or(UnknownNodeError { id })
    }
}

/// Structural copy of a subtree, see [`Tree::snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub data: NodeData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Number of nodes in the snapshot.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(NodeSnapshot::size).sum::<usize>()
    }
}

/// A borrowed handle to a live node.
///
/// Holding a `NodeRef` borrows the tree, so the node cannot be removed or
/// discarded while the handle exists.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> NodeRef<'a> {
    fn slot(&self) -> &'a Slot {
        // A NodeRef is only handed out for a live id, and the shared borrow of
        // the tree keeps it live.
        &self.tree.arena[self.id.index()]
    }

    fn wrap(&self, id: NodeId) -> NodeRef<'a> {
        NodeRef {
            tree: self.tree,
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.slot().data.kind()
    }

    pub fn data(&self) -> &'a NodeData {
        &self.slot().data
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.slot().parent.map(|id| self.wrap(id))
    }

    pub fn is_root(&self) -> bool {
        self.id == self.tree.root
    }

    /// True for a parentless node that is not the tree root.
    pub fn is_detached(&self) -> bool {
        self.slot().parent.is_none() && !self.is_root()
    }

    pub fn child_ids(&self) -> &'a [NodeId] {
        &self.slot().children
    }

    /// Children in source order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.slot()
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.slot().children.get(index).map(|&id| self.wrap(id))
    }

    pub fn child_count(&self) -> usize {
        self.slot().children.len()
    }

    /// Position of this node in its parent's child list.
    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        parent.child_ids().iter().position(|&id| id == self.id)
    }

    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        let index = self.index_in_parent()?;
        let parent = self.parent()?;
        index.checked_sub(1).and_then(|i| parent.child(i))
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        let index = self.index_in_parent()?;
        self.parent()?.child(index + 1)
    }

    /// Parent, grandparent, ... up to the top of this subtree.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// Number of ancestors.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// True if `self` is `other` or lies beneath it.
    pub fn is_within(&self, other: NodeId) -> bool {
        self.id == other || self.ancestors().any(|node| node.id == other)
    }

    /// The statement list: children that are statements, in order.
    ///
    /// This is a view over the child list. For an `If` it excludes the
    /// `ElseIf`/`Else` clauses, for a `TryCatch` the `Catch` clause.
    pub fn statements(&self) -> Vec<NodeRef<'a>> {
        self.children()
            .filter(|child| child.kind().is_statement())
            .collect()
    }

    /// `ElseIf` clauses of an `If`, in order.
    pub fn else_ifs(&self) -> Vec<NodeRef<'a>> {
        self.children()
            .filter(|child| child.kind() == NodeKind::ElseIf)
            .collect()
    }

    /// The `Else` clause of an `If`.
    pub fn else_clause(&self) -> Option<NodeRef<'a>> {
        self.children().find(|child| child.kind() == NodeKind::Else)
    }

    /// The `Catch` clause of a `TryCatch`.
    pub fn catch_clause(&self) -> Option<NodeRef<'a>> {
        self.children().find(|child| child.kind() == NodeKind::Catch)
    }

    /// The condition of an `If`, `ElseIf` or `While`.
    pub fn condition(&self) -> Option<&'a Expression> {
        self.data()
            .as_conditional()
            .map(ConditionalStatement::condition)
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            data: self.data().clone(),
            children: self.children().map(|child| child.snapshot()).collect(),
        }
    }
}
