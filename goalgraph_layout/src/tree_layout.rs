// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layered tree layouts.
//!
//! Both orientations give each node an interval along the cross axis sized by
//! its visible leaf count and place the node at the interval's midpoint. Depth
//! maps to the main axis at a fixed level spacing.

use goalgraph_model::GoalTree;
use kurbo::{Point, Size};

use crate::Positions;
use crate::config::LayoutConfig;

/// Which way the tree grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Root at the top, depth increases downward.
    Vertical,
    /// Root at the left, depth increases rightward.
    Horizontal,
}

/// Tree positions for every visible node of `tree`.
pub fn tree_positions(
    tree: &GoalTree,
    orientation: Orientation,
    size: Size,
    config: &LayoutConfig,
) -> Positions {
    let leaves = tree.leaf_count(0).max(1) as f64;
    let (extent, leaf_spacing, level_spacing) = match orientation {
        Orientation::Vertical => (
            size.width,
            config.vertical_leaf_spacing,
            config.vertical_level_spacing,
        ),
        Orientation::Horizontal => (
            size.height,
            config.horizontal_leaf_spacing,
            config.horizontal_level_spacing,
        ),
    };
    let span = (leaves * leaf_spacing).max(extent * config.tree_fill);
    let offset = (extent - span) * 0.5;
    let per_leaf = span / leaves;

    let mut out = Positions::with_capacity(tree.len());
    // (entry, start of its interval along the cross axis)
    let mut stack = vec![(0_usize, offset)];
    while let Some((idx, start)) = stack.pop() {
        let entry = &tree.entries()[idx];
        let width = tree.leaf_count(idx) as f64 * per_leaf;
        let cross = start + width * 0.5;
        let main = config.tree_margin + entry.depth as f64 * level_spacing;
        let pos = match orientation {
            Orientation::Vertical => Point::new(cross, main),
            Orientation::Horizontal => Point::new(main, cross),
        };
        out.insert(entry.id.clone(), pos);

        let mut cursor = start;
        for &child in tree.visible_children(idx) {
            stack.push((child, cursor));
            cursor += tree.leaf_count(child) as f64 * per_leaf;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalgraph_model::{GoalId, GoalNode, links_from_parents};

    fn sample() -> GoalTree {
        // root -> a -> (a1, a2), root -> b
        let nodes = vec![
            GoalNode::root("root", "Root"),
            GoalNode::sub("a", "root", "A"),
            GoalNode::sub("b", "root", "B"),
            GoalNode::sub("a1", "a", "A1"),
            GoalNode::sub("a2", "a", "A2"),
        ];
        GoalTree::build(&nodes, &links_from_parents(&nodes)).unwrap()
    }

    fn at(p: &Positions, id: &str) -> Point {
        p[&GoalId::from(id)]
    }

    fn assert_near(a: Point, b: Point) {
        assert!((a - b).hypot() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn vertical_tree_uses_leaf_intervals() {
        let tree = sample();
        let size = Size::new(1000.0, 800.0);
        let pos = tree_positions(&tree, Orientation::Vertical, size, &LayoutConfig::default());

        // 3 leaves * 120 = 360 < 800, so the tree spans 800 starting at 100.
        assert_near(at(&pos, "root"), Point::new(500.0, 100.0));
        // `a` owns two of three leaves.
        let per_leaf = 800.0 / 3.0;
        assert!((at(&pos, "a").x - (100.0 + per_leaf)).abs() < 1e-9);
        assert_eq!(at(&pos, "a").y, 250.0);
        assert!((at(&pos, "b").x - (100.0 + 2.5 * per_leaf)).abs() < 1e-9);
        assert!((at(&pos, "a1").x - (100.0 + 0.5 * per_leaf)).abs() < 1e-9);
        assert_eq!(at(&pos, "a2").y, 400.0);
    }

    #[test]
    fn wide_trees_outgrow_the_viewport() {
        let mut nodes = vec![GoalNode::root("root", "Root")];
        for i in 0..20 {
            let id = format!("c{i}");
            nodes.push(GoalNode::sub(id.as_str(), "root", id.as_str()));
        }
        let tree = GoalTree::build(&nodes, &links_from_parents(&nodes)).unwrap();
        let pos = tree_positions(
            &tree,
            Orientation::Vertical,
            Size::new(1000.0, 800.0),
            &LayoutConfig::default(),
        );
        // 20 * 120 = 2400 wide, centred on 500.
        assert!((at(&pos, "c0").x - (500.0 - 1200.0 + 60.0)).abs() < 1e-9);
        assert!((at(&pos, "c19").x - (500.0 + 1200.0 - 60.0)).abs() < 1e-9);
        assert!((at(&pos, "root").x - 500.0).abs() < 1e-9);
    }

    #[test]
    fn horizontal_tree_mirrors_axes() {
        let tree = sample();
        let size = Size::new(1000.0, 500.0);
        let pos = tree_positions(&tree, Orientation::Horizontal, size, &LayoutConfig::default());
        // 3 * 100 = 300 < 400, so the tree spans 400 starting at 50.
        assert_near(at(&pos, "root"), Point::new(100.0, 250.0));
        assert_eq!(at(&pos, "a").x, 300.0);
        assert_eq!(at(&pos, "a1").x, 500.0);
        assert!(at(&pos, "a1").y < at(&pos, "a2").y);
        assert!(at(&pos, "a2").y < at(&pos, "b").y);
    }

    #[test]
    fn collapsed_branch_takes_one_leaf() {
        let nodes = vec![
            GoalNode::root("root", "Root"),
            GoalNode::sub("a", "root", "A").with_collapsed(true),
            GoalNode::sub("b", "root", "B"),
            GoalNode::sub("a1", "a", "A1"),
            GoalNode::sub("a2", "a", "A2"),
        ];
        let tree = GoalTree::build(&nodes, &links_from_parents(&nodes)).unwrap();
        let pos = tree_positions(
            &tree,
            Orientation::Vertical,
            Size::new(1000.0, 800.0),
            &LayoutConfig::default(),
        );
        assert!(!pos.contains_key(&GoalId::from("a1")));
        assert_eq!(at(&pos, "a").x, 300.0);
        assert_eq!(at(&pos, "b").x, 700.0);
    }
}
