// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! PreorderCollector visitor: node ids in visit order.

use super::dispatch::walk;
use super::traits::{VisitOutcome, VisitResult, Visitor};
use crate::ast::{NodeId, NodeKind, NodeRef};
use crate::error::TraversalError;

/// Collects the ids of every visited node, pre-order.
///
/// Subtrees rooted at a kind in `prune` are visited but not descended into.
#[derive(Debug, Default)]
pub struct PreorderCollector {
    ids: Vec<NodeId>,
    prune: Vec<NodeKind>,
}

impl PreorderCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not descend into nodes of these kinds.
    pub fn pruning(prune: impl IntoIterator<Item = NodeKind>) -> Self {
        Self {
            ids: Vec::new(),
            prune: prune.into_iter().collect(),
        }
    }

    /// Collect every id in the subtree at `node`.
    pub fn collect(node: NodeRef<'_>) -> Result<Vec<NodeId>, TraversalError> {
        let mut collector = Self::new();
        walk(&mut collector, node)?;
        Ok(collector.ids)
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<NodeId> {
        self.ids
    }
}

impl<'a> Visitor<'a> for PreorderCollector {
    fn visit_other(&mut self, node: NodeRef<'a>) -> VisitOutcome {
        self.ids.push(node.id());
        Ok(VisitResult::from(!self.prune.contains(&node.kind())))
    }
}
