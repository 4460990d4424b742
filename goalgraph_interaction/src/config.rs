// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture thresholds and timings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gesture thresholds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct InteractionConfig {
    /// Pointer travel (world units) after which a press becomes a drag.
    pub drag_threshold: f64,
    /// Maximum time between two clicks on the same node for a double-click, in milliseconds.
    pub double_click_ms: u64,
    /// Maximum distance between two clicks for a double-click.
    pub double_click_slop: f64,
    /// Dwell before a touch press opens the context menu, in milliseconds.
    pub long_press_ms: u64,
    /// Gap between a node's bottom edge and its inline edit overlay.
    pub edit_gap: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            double_click_ms: 300,
            double_click_slop: 8.0,
            long_press_ms: 600,
            edit_gap: 12.0,
        }
    }
}
