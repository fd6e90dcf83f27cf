// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Structural-change notifications.
//!
//! Every successful mutation emits exactly one [`StructuralChange`] to every
//! registered listener, synchronously, after the tree has reached its new
//! state. Listeners get a shared borrow of the tree, so they can read it but
//! cannot edit it from inside the callback.

use serde::Serialize;
use tracing::debug;

use crate::ast::{NodeId, Tree};

/// One committed structural edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StructuralChange {
    Inserted {
        parent: NodeId,
        index: usize,
        node: NodeId,
    },
    Removed {
        parent: NodeId,
        index: usize,
        node: NodeId,
    },
    Replaced {
        parent: NodeId,
        index: usize,
        old: NodeId,
        new: NodeId,
    },
    Moved {
        node: NodeId,
        from_parent: NodeId,
        from_index: usize,
        to_parent: NodeId,
        to_index: usize,
    },
    /// A node's payload was replaced in place.
    Updated { node: NodeId },
}

/// Discriminant of a [`StructuralChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Inserted,
    Removed,
    Replaced,
    Moved,
    Updated,
}

impl StructuralChange {
    pub fn kind(&self) -> ChangeKind {
        match self {
            StructuralChange::Inserted { .. } => ChangeKind::Inserted,
            StructuralChange::Removed { .. } => ChangeKind::Removed,
            StructuralChange::Replaced { .. } => ChangeKind::Replaced,
            StructuralChange::Moved { .. } => ChangeKind::Moved,
            StructuralChange::Updated { .. } => ChangeKind::Updated,
        }
    }

    /// Nodes whose child lists or payloads changed, plus the moved nodes.
    pub fn affected(&self) -> Vec<NodeId> {
        match *self {
            StructuralChange::Inserted { parent, node, .. }
            | StructuralChange::Removed { parent, node, .. } => vec![parent, node],
            StructuralChange::Replaced {
                parent, old, new, ..
            } => vec![parent, old, new],
            StructuralChange::Moved {
                node,
                from_parent,
                to_parent,
                ..
            } => {
                if from_parent == to_parent {
                    vec![from_parent, node]
                } else {
                    vec![from_parent, to_parent, node]
                }
            }
            StructuralChange::Updated { node } => vec![node],
        }
    }
}

/// Handle returned by [`Tree::on_structural_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

type Listener = Box<dyn FnMut(&Tree, &StructuralChange)>;

#[derive(Default)]
pub(crate) struct Observers {
    next: u64,
    listeners: Vec<(SubscriptionHandle, Listener)>,
}

impl Observers {
    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl Tree {
    /// Register a listener for structural changes.
    ///
    /// Listeners run in registration order.
    pub fn on_structural_change<F>(&mut self, listener: F) -> SubscriptionHandle
    where
        F: FnMut(&Tree, &StructuralChange) + 'static,
    {
        let handle = SubscriptionHandle(self.observers.next);
        self.observers.next += 1;
        self.observers.listeners.push((handle, Box::new(listener)));
        debug!(handle = handle.0, "subscribed to structural changes");
        handle
    }

    /// Remove a listener. Returns false if the handle was not registered.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.observers.listeners.len();
        self.observers.listeners.retain(|(h, _)| *h != handle);
        let removed = self.observers.listeners.len() != before;
        debug!(handle = handle.0, removed, "unsubscribed from structural changes");
        removed
    }

    pub(crate) fn emit(&mut self, change: StructuralChange) {
        debug!(?change, "structural change");
        // Listeners borrow the tree immutably while we hold them, so take
        // them out for the duration of the call.
        let mut listeners = std::mem::take(&mut self.observers.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(self, &change);
        }
        self.observers.listeners = listeners;
    }
}
