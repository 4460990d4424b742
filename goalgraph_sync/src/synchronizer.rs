// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-fingerprint reconciliation between local edits and owner updates.

use goalgraph_model::{Fingerprint, GoalGraph, GoalId, GoalLink, GoalNode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::patch::GraphPatch;

/// Synchronizer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SyncConfig {
    /// How long after an outbound push an inbound snapshot matching the
    /// pre-push state is treated as stale, in milliseconds.
    pub guard_window_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            guard_window_ms: 300,
        }
    }
}

/// A local edit reported to the owner and not yet echoed back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outbound {
    /// Structural fingerprint the owner should echo back.
    pub expected: Fingerprint,
    /// Structural fingerprint before the edit.
    pub previous: Fingerprint,
    /// When the edit was pushed, in milliseconds.
    pub at: u64,
}

/// What to do with an inbound snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// Same as what is already applied.
    Unchanged,
    /// The owner echoed one of our edits back. Edits made after it are
    /// still in flight when [`Synchronizer::pending`] is not empty, so the
    /// local state is ahead of the snapshot and must be kept.
    Echo,
    /// The owner re-sent the state from before our edit while the edit is in
    /// flight; applying it would undo the edit.
    Stale,
    /// The snapshot touches the node under an active drag or edit; hold it
    /// until the session ends.
    Deferred,
    /// Apply these changes.
    Apply(GraphPatch),
}

/// Tracks what was pushed out and what was applied, and classifies inbound
/// snapshots so a local edit and its echo never bounce back and forth.
///
/// ```
/// use goalgraph_model::{Fingerprint, GoalGraph, GoalNode, links_from_parents};
/// use goalgraph_sync::{Inbound, SyncConfig, Synchronizer};
///
/// let before = vec![GoalNode::root("r", "Root"), GoalNode::sub("a", "r", "A")];
/// let mut after = before.clone();
/// after[1].text = "Renamed".into();
/// let links = links_from_parents(&before);
///
/// let mut sync = Synchronizer::new(SyncConfig::default());
/// let local = GoalGraph::new(after.clone(), links.clone());
/// sync.record_outbound(
///     Fingerprint::structural(&before, &links),
///     Fingerprint::structural(&after, &links),
///     1_000,
/// );
/// assert_eq!(sync.inbound(&local, &after, &links, 1_050, None), Inbound::Echo);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Synchronizer {
    applied: Option<Fingerprint>,
    /// Oldest first.
    pending: Vec<Outbound>,
    deferred: Option<Fingerprint>,
    config: SyncConfig,
}

impl Synchronizer {
    /// Create a synchronizer with nothing applied yet.
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Fingerprint of the state currently applied locally.
    pub fn applied(&self) -> Option<&Fingerprint> {
        self.applied.as_ref()
    }

    /// Outbound edits still awaiting their echo, oldest first.
    pub fn pending(&self) -> &[Outbound] {
        &self.pending
    }

    /// Mark `fingerprint` as applied without going through [`inbound`](Self::inbound),
    /// e.g. after a full rebuild.
    pub fn mark_applied(&mut self, fingerprint: Fingerprint) {
        self.applied = Some(fingerprint);
    }

    /// Record a local edit that was reported to the owner.
    ///
    /// `expected` becomes the applied fingerprint right away, so the echo is
    /// recognized when it arrives. Edits made before earlier ones are echoed
    /// queue up behind them.
    pub fn record_outbound(&mut self, previous: Fingerprint, expected: Fingerprint, now: u64) {
        tracing::debug!(at = now, in_flight = self.pending.len(), "outbound edit recorded");
        self.applied = Some(expected.clone());
        self.pending.push(Outbound {
            expected,
            previous,
            at: now,
        });
    }

    /// Classify an inbound snapshot against the local state `current`.
    ///
    /// `session` is the node under an active drag or edit.
    pub fn inbound(
        &mut self,
        current: &GoalGraph,
        nodes: &[GoalNode],
        links: &[GoalLink],
        now: u64,
        session: Option<&GoalId>,
    ) -> Inbound {
        let fingerprint = Fingerprint::structural(nodes, links);

        if let Some(i) = self.pending.iter().position(|o| o.expected == fingerprint) {
            self.pending.drain(..=i);
            tracing::debug!(in_flight = self.pending.len(), "inbound snapshot echoes our edit");
            if self.pending.is_empty() {
                self.applied = Some(fingerprint);
            }
            self.deferred = None;
            return Inbound::Echo;
        }
        let window = self.config.guard_window_ms;
        self.pending.retain(|o| now.saturating_sub(o.at) <= window);
        if self.pending.iter().any(|o| o.previous == fingerprint) {
            tracing::debug!("inbound snapshot predates our edit; skipped");
            return Inbound::Stale;
        }

        if self.applied.as_ref() == Some(&fingerprint) {
            self.deferred = None;
            return Inbound::Unchanged;
        }

        let patch = GraphPatch::between(current.nodes(), current.links(), nodes, links);
        if let Some(node) = session {
            if patch.touches(node) {
                tracing::debug!(%node, "inbound change deferred during active session");
                self.deferred = Some(fingerprint);
                return Inbound::Deferred;
            }
        }
        tracing::debug!(
            added = patch.added.len(),
            removed = patch.removed.len(),
            updated = patch.updated.len(),
            moved = patch.moved.len(),
            "inbound patch"
        );
        self.applied = Some(fingerprint);
        self.pending.clear();
        self.deferred = None;
        Inbound::Apply(patch)
    }

    /// Whether an inbound snapshot is waiting for a session to end.
    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Take the deferred snapshot's fingerprint once the session ended. The
    /// caller then replays the latest inbound snapshot.
    pub fn take_deferred(&mut self) -> Option<Fingerprint> {
        self.deferred.take()
    }

    /// Forget everything, e.g. when the engine is reset.
    pub fn reset(&mut self) {
        self.applied = None;
        self.pending.clear();
        self.deferred = None;
    }
}
