// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Circle hit testing for picking and drop targets.

use goalgraph_model::GoalId;
use kurbo::{Circle, Point};

/// A node's pickable disc, in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeCircle {
    /// Node the disc belongs to.
    pub id: GoalId,
    /// Disc center.
    pub center: Point,
    /// Disc radius.
    pub radius: f64,
}

impl NodeCircle {
    /// Create a disc.
    pub fn new(id: impl Into<GoalId>, center: Point, radius: f64) -> Self {
        Self {
            id: id.into(),
            center,
            radius,
        }
    }

    /// Whether `pt` lies inside or on the disc.
    pub fn contains(&self, pt: Point) -> bool {
        self.center.distance_squared(pt) <= self.radius * self.radius
    }

    /// Whether a disc of `radius` centred at `pt` overlaps this one.
    pub fn overlaps(&self, pt: Point, radius: f64) -> bool {
        self.center.distance(pt) < self.radius + radius
    }

    /// The disc as a kurbo shape.
    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }
}

/// Topmost disc containing `pt`.
///
/// `circles` is in draw order, so later entries sit above earlier ones.
pub fn hit_test(circles: &[NodeCircle], pt: Point) -> Option<&NodeCircle> {
    circles.iter().rev().find(|c| c.contains(pt))
}

/// Nearest disc overlapping a dragged disc of `radius` at `pt`, excluding the
/// dragged node itself.
///
/// Ties on distance go to the earlier disc.
pub fn drop_target<'a>(
    circles: &'a [NodeCircle],
    dragged: &GoalId,
    pt: Point,
    radius: f64,
) -> Option<&'a NodeCircle> {
    let mut best: Option<(&NodeCircle, f64)> = None;
    for c in circles {
        if &c.id == dragged || !c.overlaps(pt, radius) {
            continue;
        }
        let d = c.center.distance(pt);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((c, d));
        }
    }
    best.map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circles() -> Vec<NodeCircle> {
        vec![
            NodeCircle::new("root", Point::new(0.0, 0.0), 65.0),
            NodeCircle::new("a", Point::new(200.0, 0.0), 45.0),
            NodeCircle::new("b", Point::new(260.0, 0.0), 45.0),
        ]
    }

    #[test]
    fn topmost_disc_wins() {
        let cs = circles();
        // Inside both `a` and `b`; `b` is drawn later.
        assert_eq!(hit_test(&cs, Point::new(230.0, 0.0)).map(|c| c.id.as_str()), Some("b"));
        assert_eq!(hit_test(&cs, Point::new(10.0, 10.0)).map(|c| c.id.as_str()), Some("root"));
        assert!(hit_test(&cs, Point::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn drop_target_uses_circle_overlap() {
        let cs = circles();
        let dragged = GoalId::from("x");
        // 100 from root center: 100 < 65 + 35 is false, so no overlap.
        assert!(drop_target(&cs, &dragged, Point::new(0.0, 100.0), 35.0).is_none());
        assert_eq!(
            drop_target(&cs, &dragged, Point::new(0.0, 99.0), 35.0).map(|c| c.id.as_str()),
            Some("root")
        );
    }

    #[test]
    fn nearest_overlap_wins_and_self_is_skipped() {
        let cs = circles();
        let a = GoalId::from("a");
        let x = GoalId::from("x");
        assert_eq!(
            drop_target(&cs, &x, Point::new(215.0, 0.0), 45.0).map(|c| c.id.as_str()),
            Some("a")
        );
        assert_eq!(
            drop_target(&cs, &a, Point::new(215.0, 0.0), 45.0).map(|c| c.id.as_str()),
            Some("b")
        );
    }
}
