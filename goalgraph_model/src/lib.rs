// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Goalgraph Model: the goal hierarchy, its tree builder and structural fingerprints.
//!
//! This crate is the data layer shared by the layout, interaction and sync crates.
//!
//! - [`GoalNode`] / [`GoalLink`]: the flat node and edge collections supplied by
//!   the external owner. Links mirror [`GoalNode::parent_id`].
//! - [`GoalTree`]: a single rooted tree built from those collections. A missing
//!   ROOT yields `None` (nothing to render); orphans are left out.
//! - [`GoalGraph`]: an owned snapshot with invariant-preserving edits
//!   (cascading delete, cycle-checked re-parent). The engine uses it for its
//!   optimistic local copy; the owner's arrays are never mutated.
//! - [`Fingerprint`] / [`DiffGuard`]: a cheap key over everything a rebuild
//!   depends on, and a gate that skips rebuilds when the key is unchanged.
//!
//! ## Invariants
//!
//! 1. Exactly one node has kind [`GoalKind::Root`] and it has no parent.
//!    If several claim it, the first is used.
//! 2. The parent graph is acyclic; [`validate_reparent`] enforces this by
//!    walking the ancestor chain of the proposed parent.
//! 3. Nodes whose parent is missing are orphans and are excluded from the tree.
//! 4. `collapsed` only affects [`GoalTree::visible`], never the collections.
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for the model types.

mod error;
mod fingerprint;
mod graph;
mod tree;
mod types;

pub use error::GraphError;
pub use fingerprint::{DiffGuard, Fingerprint, FingerprintInput};
pub use graph::{GoalGraph, ParentLookup, ancestors, is_ancestor_or_self, validate_reparent};
pub use tree::{Children, GoalTree, TreeEntry};
pub use types::{
    GoalId, GoalKind, GoalLink, GoalNode, GoalStatus, LayoutMode, NodeUpdate, links_from_parents,
};
