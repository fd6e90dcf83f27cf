// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node identity.

use generational_arena::Index;
use serde::{Serialize, Serializer};

/// A stable, opaque identifier for a node in a [`Tree`](super::Tree).
///
/// NodeIds are generational arena indices: a slot freed by `discard` may be
/// reused for a new node, but with a new generation, so an old id never
/// aliases the new node. Lookups with a stale id fail with
/// [`UnknownNodeError`](crate::error::UnknownNodeError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl NodeId {
    pub(crate) fn new(index: Index) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> Index {
        self.0
    }

    /// Slot position and generation, for diagnostics and external keys.
    pub fn into_raw_parts(self) -> (usize, u64) {
        self.0.into_raw_parts()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        if generation == 0 {
            write!(f, "n{}", slot)
        } else {
            write!(f, "n{}g{}", slot, generation)
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_first_generation() {
        let id = NodeId::new(Index::from_raw_parts(3, 0));
        assert_eq!(id.to_string(), "n3");
    }

    #[test]
    fn test_display_later_generation() {
        let id = NodeId::new(Index::from_raw_parts(3, 2));
        assert_eq!(id.to_string(), "n3g2");
    }

    #[test]
    fn test_serializes_as_string() {
        let id = NodeId::new(Index::from_raw_parts(7, 0));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"n7\"");
    }
}
