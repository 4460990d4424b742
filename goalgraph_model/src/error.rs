// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for graph mutations.
//!
//! None of these are fatal: callers turn them into a snap-back or a no-op.

use crate::types::GoalId;

/// A mutation that would break one of the hierarchy invariants.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The id is not part of the node collection.
    #[error("unknown goal `{0}`")]
    UnknownNode(GoalId),
    /// The root has no parent and cannot be moved or deleted.
    #[error("the root goal `{0}` cannot be re-parented or deleted")]
    RootImmovable(GoalId),
    /// A node cannot become its own parent.
    #[error("goal `{0}` cannot be its own parent")]
    SelfParent(GoalId),
    /// The proposed parent is a descendant of the node being moved.
    #[error("moving `{child}` under `{parent}` would create a cycle")]
    Cycle {
        /// The node being moved.
        child: GoalId,
        /// The proposed parent, a descendant of `child`.
        parent: GoalId,
    },
    /// The node is already attached to that parent.
    #[error("`{child}` is already a child of `{parent}`")]
    AlreadyChild {
        /// The node being moved.
        child: GoalId,
        /// Its current parent.
        parent: GoalId,
    },
    /// A node with this id already exists.
    #[error("goal `{0}` already exists")]
    DuplicateId(GoalId),
    /// Empty text on the root is rejected; the previous label is kept.
    #[error("the root goal label cannot be empty")]
    EmptyRootText,
}
