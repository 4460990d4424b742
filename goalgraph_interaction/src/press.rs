// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press tracking for a single pointer.
//!
//! [`PressState`] turns raw down/move/up events into the gestures the
//! controller cares about: click, double-click, the start of a drag, and
//! a long press.
//!
//! ```
//! use goalgraph_interaction::{InteractionConfig, PointerKind, PressOutcome, PressState};
//! use goalgraph_model::GoalId;
//! use kurbo::Point;
//!
//! let mut press = PressState::new(InteractionConfig::default());
//! let a = GoalId::from("a");
//!
//! press.on_down(Some(a.clone()), Point::new(10.0, 10.0), PointerKind::Mouse, 1000);
//! assert_eq!(press.on_up(Point::new(11.0, 10.0), 1050), PressOutcome::Click(Some(a.clone())));
//!
//! press.on_down(Some(a.clone()), Point::new(10.0, 10.0), PointerKind::Mouse, 1200);
//! assert_eq!(press.on_up(Point::new(10.0, 10.0), 1250), PressOutcome::DoubleClick(a));
//! ```

use goalgraph_model::GoalId;
use kurbo::Point;

use crate::config::InteractionConfig;

/// Kind of device behind a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    /// Mouse or trackpad.
    Mouse,
    /// Finger on a touch screen.
    Touch,
    /// Stylus.
    Pen,
}

impl PointerKind {
    /// Whether a held press on this device opens the context menu.
    pub fn long_presses(self) -> bool {
        !matches!(self, Self::Mouse)
    }
}

/// An active press.
#[derive(Clone, Debug)]
pub struct Press {
    /// Node under the pointer at press time, if any.
    pub target: Option<GoalId>,
    /// Pointer position at press time.
    pub down_position: Point,
    /// Timestamp of the press, in milliseconds.
    pub down_time: u64,
    /// Device that pressed.
    pub kind: PointerKind,
    /// True once the pointer travelled past the drag threshold.
    pub dragging: bool,
    /// True once the long-press fired; the release is then swallowed.
    pub long_pressed: bool,
}

/// What a release turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    /// A click on a node, or on empty canvas when `None`.
    Click(Option<GoalId>),
    /// Second click on the same node within the double-click window.
    DoubleClick(GoalId),
    /// The press had turned into a drag.
    DragEnd,
    /// Nothing to report (no press, or the long press already fired).
    None,
}

#[derive(Clone, Debug)]
struct LastClick {
    target: GoalId,
    position: Point,
    time: u64,
}

/// Single-pointer press tracker.
#[derive(Clone, Debug)]
pub struct PressState {
    press: Option<Press>,
    last_click: Option<LastClick>,
    config: InteractionConfig,
}

impl PressState {
    /// Create a tracker with the given thresholds.
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            press: None,
            last_click: None,
            config,
        }
    }

    /// Record a press. Any earlier press is replaced.
    pub fn on_down(&mut self, target: Option<GoalId>, position: Point, kind: PointerKind, now: u64) {
        self.press = Some(Press {
            target,
            down_position: position,
            down_time: now,
            kind,
            dragging: false,
            long_pressed: false,
        });
    }

    /// Track movement. Returns `true` the first time the pointer leaves the
    /// drag threshold, which also cancels a pending long press.
    pub fn on_move(&mut self, position: Point) -> bool {
        let threshold = self.config.drag_threshold;
        let Some(press) = self.press.as_mut() else {
            return false;
        };
        if press.dragging || press.long_pressed {
            return false;
        }
        if press.down_position.distance(position) > threshold {
            press.dragging = true;
            return true;
        }
        false
    }

    /// Classify the release of the active press.
    pub fn on_up(&mut self, position: Point, now: u64) -> PressOutcome {
        let Some(press) = self.press.take() else {
            return PressOutcome::None;
        };
        if press.long_pressed {
            return PressOutcome::None;
        }
        if press.dragging {
            self.last_click = None;
            return PressOutcome::DragEnd;
        }
        let Some(target) = press.target else {
            self.last_click = None;
            return PressOutcome::Click(None);
        };
        let double = self.last_click.take().is_some_and(|last| {
            last.target == target
                && now.saturating_sub(last.time) <= self.config.double_click_ms
                && last.position.distance(position) <= self.config.double_click_slop
        });
        if double {
            return PressOutcome::DoubleClick(target);
        }
        self.last_click = Some(LastClick {
            target: target.clone(),
            position,
            time: now,
        });
        PressOutcome::Click(Some(target))
    }

    /// Fire the long press once its dwell has elapsed.
    ///
    /// Returns the press target and position the first time `now` reaches the
    /// deadline of an undisturbed touch or pen press on a node.
    pub fn poll(&mut self, now: u64) -> Option<(GoalId, Point)> {
        let dwell = self.config.long_press_ms;
        let press = self.press.as_mut()?;
        if press.dragging || press.long_pressed || !press.kind.long_presses() {
            return None;
        }
        let target = press.target.as_ref()?;
        if now.saturating_sub(press.down_time) < dwell {
            return None;
        }
        press.long_pressed = true;
        self.last_click = None;
        tracing::trace!(node = %target, "long press");
        Some((target.clone(), press.down_position))
    }

    /// Deadline of the pending long press, if one is armed.
    pub fn long_press_deadline(&self) -> Option<u64> {
        let press = self.press.as_ref()?;
        (press.target.is_some()
            && press.kind.long_presses()
            && !press.dragging
            && !press.long_pressed)
            .then_some(press.down_time + self.config.long_press_ms)
    }

    /// Drop the active press, e.g. on pointer leave. Returns `true` if one was active.
    pub fn cancel(&mut self) -> bool {
        self.press.take().is_some()
    }

    /// The active press.
    pub fn press(&self) -> Option<&Press> {
        self.press.as_ref()
    }

    /// Whether a press is active.
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PressState {
        PressState::new(InteractionConfig::default())
    }

    fn id(s: &str) -> Option<GoalId> {
        Some(GoalId::from(s))
    }

    #[test]
    fn small_jitter_is_still_a_click() {
        let mut p = state();
        p.on_down(id("a"), Point::new(0.0, 0.0), PointerKind::Mouse, 0);
        assert!(!p.on_move(Point::new(3.0, 4.0)));
        assert_eq!(p.on_up(Point::new(3.0, 4.0), 10), PressOutcome::Click(id("a")));
    }

    #[test]
    fn travel_past_threshold_starts_a_drag_once() {
        let mut p = state();
        p.on_down(id("a"), Point::new(0.0, 0.0), PointerKind::Mouse, 0);
        assert!(p.on_move(Point::new(6.0, 0.0)));
        assert!(!p.on_move(Point::new(20.0, 0.0)));
        assert_eq!(p.on_up(Point::new(20.0, 0.0), 10), PressOutcome::DragEnd);
        assert!(!p.is_pressed());
    }

    #[test]
    fn double_click_needs_same_node_and_window() {
        let mut p = state();
        p.on_down(id("a"), Point::ZERO, PointerKind::Mouse, 0);
        p.on_up(Point::ZERO, 10);
        p.on_down(id("b"), Point::ZERO, PointerKind::Mouse, 100);
        assert_eq!(p.on_up(Point::ZERO, 110), PressOutcome::Click(id("b")));

        p.on_down(id("b"), Point::ZERO, PointerKind::Mouse, 900);
        assert_eq!(p.on_up(Point::ZERO, 910), PressOutcome::Click(id("b")), "too slow");

        p.on_down(id("b"), Point::ZERO, PointerKind::Mouse, 1000);
        assert_eq!(p.on_up(Point::ZERO, 1010), PressOutcome::DoubleClick(GoalId::from("b")));

        // A third click starts over.
        p.on_down(id("b"), Point::ZERO, PointerKind::Mouse, 1100);
        assert_eq!(p.on_up(Point::ZERO, 1110), PressOutcome::Click(id("b")));
    }

    #[test]
    fn touch_long_press_fires_once_and_swallows_release() {
        let mut p = state();
        p.on_down(id("a"), Point::new(5.0, 5.0), PointerKind::Touch, 1000);
        assert_eq!(p.long_press_deadline(), Some(1600));
        assert!(p.poll(1599).is_none());
        assert_eq!(p.poll(1600), Some((GoalId::from("a"), Point::new(5.0, 5.0))));
        assert!(p.poll(1700).is_none());
        assert_eq!(p.on_up(Point::new(5.0, 5.0), 1800), PressOutcome::None);
    }

    #[test]
    fn long_press_is_cancelled_by_movement_release_or_leave() {
        let mut p = state();
        p.on_down(id("a"), Point::ZERO, PointerKind::Touch, 0);
        p.on_move(Point::new(50.0, 0.0));
        assert!(p.poll(1000).is_none());

        p.on_down(id("a"), Point::ZERO, PointerKind::Touch, 0);
        p.on_up(Point::ZERO, 100);
        assert!(p.poll(1000).is_none());

        p.on_down(id("a"), Point::ZERO, PointerKind::Touch, 0);
        assert!(p.cancel());
        assert!(p.poll(1000).is_none());
    }

    #[test]
    fn mouse_and_empty_canvas_never_long_press() {
        let mut p = state();
        p.on_down(id("a"), Point::ZERO, PointerKind::Mouse, 0);
        assert!(p.long_press_deadline().is_none());
        assert!(p.poll(5000).is_none());

        p.on_down(None, Point::ZERO, PointerKind::Touch, 0);
        assert!(p.poll(5000).is_none());
        assert_eq!(p.on_up(Point::ZERO, 5000), PressOutcome::Click(None));
    }
}
