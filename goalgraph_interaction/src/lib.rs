// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Goalgraph Interaction: gestures over a rendered goal graph.
//!
//! The pieces compose bottom-up:
//!
//! - [`hit_test`] and [`drop_target`] pick nodes by circle. Picking prefers
//!   the topmost disc; drop targets use the overlap test
//!   `distance(pointer, other.center) < other.radius + dragged.radius`, and
//!   the nearest overlap wins.
//! - [`PressState`] classifies a single pointer's presses into click,
//!   double-click, drag start and long press. Timestamps are caller-supplied
//!   milliseconds; there are no timers, only [`PressState::poll`].
//! - [`EditSession`] holds the inline editor's buffer and decides what a
//!   commit means: empty text deletes a non-root node and is rejected on the root.
//! - [`ContextMenu`] lists the [`MenuAction`]s offered for a node.
//! - [`Controller`] ties them together as a modal state machine and emits
//!   [`Intent`]s. Re-parent requests are checked against the ancestor chain
//!   of the proposed parent before they are emitted.
//!
//! Only one drag or edit session exists at a time. Starting one ends the
//! other: a drag is released, an edit is committed.
//!
//! All positions are in world space. Callers map screen coordinates through
//! their viewport first.
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for [`InteractionConfig`].

mod config;
mod controller;
mod edit;
mod hit;
mod menu;
mod press;

pub use config::InteractionConfig;
pub use controller::{Controller, Intent, Key, Mode, PointerButton, PointerEvent, SceneQuery};
pub use edit::{EditOutcome, EditSession};
pub use hit::{NodeCircle, drop_target, hit_test};
pub use menu::{ContextMenu, MenuAction};
pub use press::{PointerKind, Press, PressOutcome, PressState};
