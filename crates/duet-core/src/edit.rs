// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The mutation API.
//!
//! Every operation validates the whole request first (ids, bounds, cycles and
//! the resulting child layout) and only then commits. A rejected edit returns
//! a [`StructuralEditError`] and leaves the tree exactly as it was; a
//! committed edit emits one [`StructuralChange`].
//!
//! Only [`Tree::move_child`] reparents an attached node. `insert_child` and
//! `replace_child` take detached nodes, so a node is never silently stolen
//! from another parent.

use tracing::instrument;

use crate::ast::{check_layout, NodeData, NodeId, NodeKind, Tree};
use crate::error::StructuralEditError;
use crate::events::StructuralChange;

impl Tree {
    /// Insert the detached `node` as child `index` of `parent` (`0..=len`).
    #[instrument(level = "trace", skip(self))]
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        node: NodeId,
    ) -> Result<(), StructuralEditError> {
        let len = self.slot(parent)?.children.len();
        self.check_insertable(node, "insert_child")?;
        if index > len {
            return Err(StructuralEditError::IndexOutOfBounds { parent, index, len });
        }
        self.check_acyclic(node, parent)?;

        let mut kinds = self.child_kinds(parent)?;
        kinds.insert(index, self.kind_of(node)?);
        check_layout(parent, self.kind_of(parent)?, &kinds)?;

        self.slot_mut(parent)?.children.insert(index, node);
        self.slot_mut(node)?.parent = Some(parent);
        self.emit(StructuralChange::Inserted {
            parent,
            index,
            node,
        });
        Ok(())
    }

    /// Insert the detached `node` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), StructuralEditError> {
        let len = self.slot(parent)?.children.len();
        self.insert_child(parent, len, node)
    }

    /// Detach child `index` of `parent` and return it.
    ///
    /// The removed subtree stays alive and can be inserted again.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(
        &mut self,
        parent: NodeId,
        index: usize,
    ) -> Result<NodeId, StructuralEditError> {
        let node = self.child_at(parent, index)?;

        self.slot_mut(parent)?.children.remove(index);
        self.slot_mut(node)?.parent = None;
        self.emit(StructuralChange::Removed {
            parent,
            index,
            node,
        });
        Ok(node)
    }

    /// Put the detached `node` in place of child `index` of `parent`.
    ///
    /// Returns the old child, now detached.
    #[instrument(level = "trace", skip(self))]
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        index: usize,
        node: NodeId,
    ) -> Result<NodeId, StructuralEditError> {
        let old = self.child_at(parent, index)?;
        self.check_insertable(node, "replace_child")?;
        self.check_acyclic(node, parent)?;

        let mut kinds = self.child_kinds(parent)?;
        kinds[index] = self.kind_of(node)?;
        check_layout(parent, self.kind_of(parent)?, &kinds)?;

        self.slot_mut(parent)?.children[index] = node;
        self.slot_mut(node)?.parent = Some(parent);
        self.slot_mut(old)?.parent = None;
        self.emit(StructuralChange::Replaced {
            parent,
            index,
            old,
            new: node,
        });
        Ok(old)
    }

    /// Move child `from_index` of `from_parent` to position `to_index` of
    /// `to_parent`, where `to_index` indexes the destination child list as it
    /// is after the source removal.
    ///
    /// Equivalent to `remove_child` followed by `insert_child`, but atomic and
    /// reported as a single change. Returns the moved node.
    #[instrument(level = "trace", skip(self))]
    pub fn move_child(
        &mut self,
        from_parent: NodeId,
        from_index: usize,
        to_parent: NodeId,
        to_index: usize,
    ) -> Result<NodeId, StructuralEditError> {
        let node = self.child_at(from_parent, from_index)?;
        self.slot(to_parent)?;
        self.check_acyclic(node, to_parent)?;

        let mut kinds = self.child_kinds(to_parent)?;
        if from_parent == to_parent {
            kinds.remove(from_index);
        }
        if to_index > kinds.len() {
            return Err(StructuralEditError::IndexOutOfBounds {
                parent: to_parent,
                index: to_index,
                len: kinds.len(),
            });
        }
        kinds.insert(to_index, self.kind_of(node)?);
        check_layout(to_parent, self.kind_of(to_parent)?, &kinds)?;

        self.slot_mut(from_parent)?.children.remove(from_index);
        self.slot_mut(to_parent)?.children.insert(to_index, node);
        self.slot_mut(node)?.parent = Some(to_parent);
        self.emit(StructuralChange::Moved {
            node,
            from_parent,
            from_index,
            to_parent,
            to_index,
        });
        Ok(node)
    }

    /// Replace the payload of `node` with another payload of the same kind.
    ///
    /// Returns the old payload.
    #[instrument(level = "trace", skip(self))]
    pub fn update(&mut self, node: NodeId, data: NodeData) -> Result<NodeData, StructuralEditError> {
        let expected = self.kind_of(node)?;
        let found = data.kind();
        if expected != found {
            return Err(StructuralEditError::KindMismatch {
                node,
                expected,
                found,
            });
        }

        let old = std::mem::replace(&mut self.slot_mut(node)?.data, data);
        self.emit(StructuralChange::Updated { node });
        Ok(old)
    }

    // ------------------------------------------------------------------------
    // Validation helpers
    // ------------------------------------------------------------------------

    fn kind_of(&self, id: NodeId) -> Result<NodeKind, StructuralEditError> {
        Ok(self.slot(id)?.data.kind())
    }

    fn child_kinds(&self, parent: NodeId) -> Result<Vec<NodeKind>, StructuralEditError> {
        let slot = self.slot(parent)?;
        slot.children
            .iter()
            .map(|&child| self.kind_of(child))
            .collect()
    }

    fn child_at(&self, parent: NodeId, index: usize) -> Result<NodeId, StructuralEditError> {
        let children = &self.slot(parent)?.children;
        children
            .get(index)
            .copied()
            .ok_or(StructuralEditError::IndexOutOfBounds {
                parent,
                index,
                len: children.len(),
            })
    }

    /// `node` must be live, detached and not the root.
    fn check_insertable(
        &self,
        node: NodeId,
        operation: &'static str,
    ) -> Result<(), StructuralEditError> {
        let slot = self.slot(node)?;
        if node == self.root_id() {
            return Err(StructuralEditError::RootNode { node, operation });
        }
        if let Some(parent) = slot.parent {
            return Err(StructuralEditError::AlreadyAttached { node, parent });
        }
        Ok(())
    }

    /// `parent` must not be `node` or one of its descendants.
    fn check_acyclic(&self, node: NodeId, parent: NodeId) -> Result<(), StructuralEditError> {
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == node {
                return Err(StructuralEditError::Cycle { node, parent });
            }
            cursor = self.slot(id)?.parent;
        }
        Ok(())
    }
}
