// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radial layout: the root at the center, each generation on a ring.
//!
//! Every node owns an angular sector. Its visible children split that sector
//! either equally (small families) or by subtree leaf count (large families),
//! so a dense branch cannot crowd out a sparse neighbour. A child sits at the
//! center angle of its own sector.

use core::f64::consts::TAU;

use goalgraph_model::GoalTree;
use kurbo::{Point, Size, Vec2};

use crate::Positions;
use crate::config::LayoutConfig;

/// A contiguous angular range, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sector {
    /// First angle of the range.
    pub start: f64,
    /// Last angle of the range.
    pub end: f64,
}

impl Sector {
    /// A sector starting at `start` and `span` radians wide.
    pub fn new(start: f64, span: f64) -> Self {
        Self {
            start,
            end: start + span,
        }
    }

    /// Angular width.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Angle halfway through the range.
    pub fn mid(&self) -> f64 {
        self.start + self.span() * 0.5
    }
}

/// How a parent's sector is divided among its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spacing {
    /// Every child gets the same share.
    Equal,
    /// Each child's share is proportional to the leaves in its subtree.
    LeafWeighted,
}

/// Spacing rule for a parent with `child_count` visible children.
pub fn spacing_for(child_count: usize, config: &LayoutConfig) -> Spacing {
    if child_count <= config.equal_spacing_max_children {
        Spacing::Equal
    } else {
        Spacing::LeafWeighted
    }
}

/// Split `parent` into contiguous sub-sectors proportional to `weights`.
///
/// The sub-sectors tile the parent exactly: the first starts at
/// `parent.start`, each starts where the previous one ends, and the last ends
/// at `parent.end`. Non-positive weights
/// get an empty share; if no weight is positive the split is equal.
pub fn allocate_sectors(parent: Sector, weights: &[f64]) -> Vec<Sector> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let total: f64 = weights.iter().copied().filter(|w| *w > 0.0).sum();
    let mut out = Vec::with_capacity(n);
    let span = parent.span();
    let mut cursor = parent.start;
    for (i, &w) in weights.iter().enumerate() {
        let end = if i + 1 == n {
            parent.end
        } else if total > 0.0 {
            cursor + span * w.max(0.0) / total
        } else {
            cursor + span / n as f64
        };
        out.push(Sector { start: cursor, end });
        cursor = end;
    }
    out
}

/// Radius of the ring holding the children of a node at `parent_depth`.
///
/// Around the root the ring only has to fit `child_count` siblings at the
/// minimum arc spacing. Deeper rings also respect the per-depth base radius
/// `radial_base_ring + depth * radial_ring_step`, and every ring lies at least
/// one step outside its parent.
pub fn ring_radius(
    parent_depth: usize,
    parent_radius: f64,
    child_count: usize,
    config: &LayoutConfig,
) -> f64 {
    let needed = child_count as f64 * config.radial_sibling_arc;
    let ring = if parent_depth == 0 {
        needed / TAU
    } else {
        let base = config.radial_base_ring + parent_depth as f64 * config.radial_ring_step;
        needed.max(TAU * base) / TAU
    };
    ring.max(config.radial_min_ring)
        .max(parent_radius + config.radial_ring_step)
}

/// Radial positions for every visible node of `tree`.
pub fn radial_positions(tree: &GoalTree, size: Size, config: &LayoutConfig) -> Positions {
    let center = Point::new(size.width * 0.5, size.height * 0.5);
    let mut out = Positions::with_capacity(tree.len());
    out.insert(tree.root().id.clone(), center);

    // (entry, sector, distance from center)
    let mut stack: Vec<(usize, Sector, f64)> = Vec::new();
    let root_kids = tree.visible_children(0);
    if !root_kids.is_empty() {
        let weights = child_weights(tree, root_kids, config);
        let total: f64 = weights.iter().sum();
        // Rotate the full circle so the first child's center lands on `start_angle`.
        let first_half = if total > 0.0 {
            TAU * weights[0] / total * 0.5
        } else {
            0.0
        };
        stack.push((0, Sector::new(config.start_angle - first_half, TAU), 0.0));
    }

    while let Some((idx, sector, radius)) = stack.pop() {
        let kids = tree.visible_children(idx);
        if kids.is_empty() {
            continue;
        }
        let depth = tree.entries()[idx].depth;
        let ring = ring_radius(depth, radius, kids.len(), config);
        let weights = child_weights(tree, kids, config);
        for (&child, sub) in kids.iter().zip(allocate_sectors(sector, &weights)) {
            let angle = sub.mid();
            let pos = center + Vec2::from_angle(angle) * ring;
            out.insert(tree.entries()[child].id.clone(), pos);
            stack.push((child, sub, ring));
        }
    }
    out
}

fn child_weights(tree: &GoalTree, kids: &[usize], config: &LayoutConfig) -> Vec<f64> {
    match spacing_for(kids.len(), config) {
        Spacing::Equal => vec![1.0; kids.len()],
        Spacing::LeafWeighted => kids.iter().map(|&k| tree.leaf_count(k) as f64).collect(),
    }
}
