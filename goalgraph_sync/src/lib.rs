// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Goalgraph Sync: keep a goal graph view and its external owner in step.
//!
//! The owner holds the authoritative node and link arrays. The view edits
//! optimistically, reports each edit through a callback, and later receives
//! the owner's updated arrays. Without care the echo of an edit, or a late
//! snapshot from before it, would be re-applied and could undo it.
//!
//! [`Synchronizer`] compares structural fingerprints instead of keeping
//! ad hoc "this is my own echo" flags:
//!
//! - after a local edit, [`Synchronizer::record_outbound`] remembers the
//!   fingerprint before the edit and the one the owner should send back;
//! - an inbound snapshot equal to the expected one is an [`Inbound::Echo`];
//! - one equal to the pre-edit state within the guard window is
//!   [`Inbound::Stale`];
//! - one that touches the node under an active drag or edit is
//!   [`Inbound::Deferred`] until the session ends;
//! - anything else becomes a minimal [`GraphPatch`].
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for [`SyncConfig`].

mod patch;
mod synchronizer;

pub use patch::{GraphPatch, Move};
pub use synchronizer::{Inbound, Outbound, SyncConfig, Synchronizer};
