// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inline label editing.

use goalgraph_model::GoalId;
use kurbo::Point;

/// Result of committing an edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// New label for the node.
    Update(String),
    /// Empty label on a non-root node: discard the node.
    Delete,
    /// Empty label on the root: keep the previous label.
    Rejected,
    /// Label unchanged.
    Unchanged,
}

/// An open inline editor for one node's label.
#[derive(Clone, Debug)]
pub struct EditSession {
    node: GoalId,
    original: String,
    buffer: String,
    composing: bool,
    is_root: bool,
    anchor: Point,
}

impl EditSession {
    /// Open an editor for `node`, pre-filled with `original` and placed at `anchor`.
    pub fn new(node: GoalId, original: impl Into<String>, is_root: bool, anchor: Point) -> Self {
        let original = original.into();
        Self {
            node,
            buffer: original.clone(),
            original,
            composing: false,
            is_root,
            anchor,
        }
    }

    /// Node being edited.
    pub fn node(&self) -> &GoalId {
        &self.node
    }

    /// Current editor contents.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Label at the time the editor opened.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Replace the editor contents.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Mark whether an IME composition is in progress.
    pub fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
    }

    /// Whether an IME composition is in progress; Enter does not commit then.
    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Top-center of the overlay, just below the node.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Move the overlay, e.g. when the node moves under a running simulation.
    pub fn set_anchor(&mut self, anchor: Point) {
        self.anchor = anchor;
    }

    /// Decide what the current contents mean.
    ///
    /// Surrounding whitespace is ignored.
    pub fn commit(&self) -> EditOutcome {
        let text = self.buffer.trim();
        if text.is_empty() {
            if self.is_root {
                EditOutcome::Rejected
            } else {
                EditOutcome::Delete
            }
        } else if text == self.original {
            EditOutcome::Unchanged
        } else {
            EditOutcome::Update(text.to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(is_root: bool) -> EditSession {
        EditSession::new(GoalId::from("a"), "Train", is_root, Point::ZERO)
    }

    #[test]
    fn outcomes() {
        let mut s = session(false);
        assert_eq!(s.commit(), EditOutcome::Unchanged);
        s.set_text("  Train daily ");
        assert_eq!(s.commit(), EditOutcome::Update("Train daily".into()));
        s.set_text("   ");
        assert_eq!(s.commit(), EditOutcome::Delete);
        assert_eq!(s.original(), "Train");
    }

    #[test]
    fn empty_root_label_is_rejected() {
        let mut s = session(true);
        s.set_text("");
        assert_eq!(s.commit(), EditOutcome::Rejected);
    }
}
