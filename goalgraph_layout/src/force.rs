// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Force-directed layout as an explicit step function.
//!
//! [`Simulation`] owns one body per visible node and advances by one
//! [`tick`](Simulation::tick) per animation frame. Each tick cools `alpha`,
//! accumulates velocity from the link, many-body, collision and radial
//! forces, shifts everything toward the center, then integrates with velocity
//! decay. Pinned bodies stay where they were put.
//!
//! Seeding is deterministic: cached positions are reused, and new bodies are
//! placed on a phyllotaxis spiral around their parent, so two simulations
//! built from the same inputs evolve identically.

use core::f64::consts::PI;

use goalgraph_model::{GoalId, GoalTree};
use hashbrown::HashMap;
use kurbo::{Point, Size, Vec2};

use crate::Positions;
use crate::config::{ForceConfig, LayoutConfig};

const SEED_RADIUS: f64 = 10.0;

#[derive(Clone, Debug)]
struct Body {
    pos: Point,
    vel: Vec2,
    depth: usize,
    radius: f64,
    charge: f64,
    pinned: Option<Point>,
}

#[derive(Clone, Copy, Debug)]
struct Spring {
    source: usize,
    target: usize,
    distance: f64,
    /// Share of the correction applied to the target.
    bias: f64,
}

/// How a simulation was seeded, which decides its warm-up burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Start {
    /// No cached positions: full alpha, long warm-up.
    Cold,
    /// At least one body came from cached positions: resume alpha, short warm-up.
    Warm,
}

/// Stateful force-directed layout over the visible nodes of a [`GoalTree`].
///
/// ```
/// use goalgraph_layout::{LayoutConfig, Simulation};
/// use goalgraph_model::{GoalNode, GoalTree, links_from_parents};
/// use kurbo::Size;
///
/// let nodes = vec![
///     GoalNode::root("r", "Root"),
///     GoalNode::sub("a", "r", "A"),
///     GoalNode::sub("b", "r", "B"),
/// ];
/// let tree = GoalTree::build(&nodes, &links_from_parents(&nodes)).unwrap();
/// let mut sim = Simulation::new(&tree, Size::new(800.0, 600.0), &LayoutConfig::default(), None);
/// assert_eq!(sim.warm_up(), 80);
/// assert!(sim.tick());
/// assert_eq!(sim.positions().len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Simulation {
    ids: Vec<GoalId>,
    index: HashMap<GoalId, usize>,
    bodies: Vec<Body>,
    springs: Vec<Spring>,
    center: Point,
    alpha: f64,
    start: Start,
    config: ForceConfig,
}

impl Simulation {
    /// Build a simulation for the visible part of `tree`.
    ///
    /// Bodies found in `cached` start there; the rest are seeded around their
    /// parent. If any body was cached the simulation is [`Start::Warm`].
    pub fn new(
        tree: &GoalTree,
        size: Size,
        config: &LayoutConfig,
        cached: Option<&Positions>,
    ) -> Self {
        let center = Point::new(size.width * 0.5, size.height * 0.5);
        let force = config.force.clone();
        let mut ids = Vec::new();
        let mut index = HashMap::new();
        let mut bodies: Vec<Body> = Vec::new();
        let mut springs = Vec::new();
        // Tree entry -> body.
        let mut body_of: HashMap<usize, usize> = HashMap::new();
        let mut reused = false;

        for idx in tree.visible() {
            let entry = &tree.entries()[idx];
            let k = bodies.len();
            let parent_body = entry.parent.and_then(|p| body_of.get(&p).copied());
            let cached_pos = cached.and_then(|c| c.get(&entry.id).copied());
            reused |= cached_pos.is_some();
            let pos = cached_pos.unwrap_or_else(|| {
                let origin = parent_body.map_or(center, |p| bodies[p].pos);
                if parent_body.is_none() {
                    origin
                } else {
                    origin + phyllotaxis(k)
                }
            });
            bodies.push(Body {
                pos,
                vel: Vec2::ZERO,
                depth: entry.depth,
                radius: config.radius_for_depth(entry.depth),
                charge: force.charge_for(entry.depth),
                pinned: None,
            });
            if let Some(p) = parent_body {
                springs.push(Spring {
                    source: p,
                    target: k,
                    distance: force.link_distance_for(entry.depth),
                    bias: 0.0,
                });
            }
            body_of.insert(idx, k);
            index.insert(entry.id.clone(), k);
            ids.push(entry.id.clone());
        }

        // Degree bias: the better-connected end of a spring moves less.
        let mut degree = vec![0_usize; bodies.len()];
        for s in &springs {
            degree[s.source] += 1;
            degree[s.target] += 1;
        }
        for s in &mut springs {
            let (ds, dt) = (degree[s.source] as f64, degree[s.target] as f64);
            s.bias = ds / (ds + dt);
        }

        let start = if reused { Start::Warm } else { Start::Cold };
        let alpha = match start {
            Start::Cold => 1.0,
            Start::Warm => force.resume_alpha,
        };
        tracing::debug!(bodies = bodies.len(), ?start, "force simulation built");
        Self {
            ids,
            index,
            bodies,
            springs,
            center,
            alpha,
            start,
            config: force,
        }
    }

    /// Run the synchronous warm-up burst and return how many ticks ran.
    pub fn warm_up(&mut self) -> usize {
        let ticks = match self.start {
            Start::Cold => self.config.warm_up_cold,
            Start::Warm => self.config.warm_up_warm,
        };
        let mut ran = 0;
        for _ in 0..ticks {
            if !self.tick() {
                break;
            }
            ran += 1;
        }
        ran
    }

    /// Advance one step. Returns `false` without moving anything once the
    /// simulation has settled.
    pub fn tick(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }
        let cfg = &self.config;
        self.alpha += (cfg.alpha_target - self.alpha) * cfg.alpha_decay;
        let alpha = self.alpha;

        self.apply_links(alpha);
        self.apply_many_body(alpha);
        self.apply_collisions();
        self.apply_radial(alpha);
        self.apply_center();

        let keep = 1.0 - self.config.velocity_decay;
        for b in &mut self.bodies {
            if let Some(p) = b.pinned {
                b.pos = p;
                b.vel = Vec2::ZERO;
            } else {
                b.vel *= keep;
                b.pos += b.vel;
            }
        }
        tracing::trace!(alpha, "force tick");
        true
    }

    fn apply_links(&mut self, alpha: f64) {
        let strength = self.config.link_strength;
        for s in &self.springs {
            let (src, tgt) = (&self.bodies[s.source], &self.bodies[s.target]);
            let mut d = (tgt.pos + tgt.vel) - (src.pos + src.vel);
            let mut len = d.hypot();
            if len == 0.0 {
                d = jiggle(s.target);
                len = d.hypot();
            }
            let k = (len - s.distance) / len * alpha * strength;
            let d = d * k;
            self.bodies[s.target].vel -= d * s.bias;
            self.bodies[s.source].vel += d * (1.0 - s.bias);
        }
    }

    fn apply_many_body(&mut self, alpha: f64) {
        let min2 = self.config.charge_distance_min * self.config.charge_distance_min;
        let n = self.bodies.len();
        for i in 0..n {
            let mut acc = Vec2::ZERO;
            let pi = self.bodies[i].pos;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let other = &self.bodies[j];
                let mut d = other.pos - pi;
                let mut l2 = d.hypot2();
                if l2 == 0.0 {
                    d = jiggle(i + j);
                    l2 = d.hypot2();
                }
                if l2 < min2 {
                    l2 = (min2 * l2).sqrt();
                }
                acc += d * (other.charge * alpha / l2);
            }
            self.bodies[i].vel += acc;
        }
    }

    fn apply_collisions(&mut self) {
        let pad = self.config.collision_padding;
        let strength = self.config.collision_strength;
        let n = self.bodies.len();
        for i in 0..n {
            let ri = self.bodies[i].radius + pad;
            let ri2 = ri * ri;
            for j in (i + 1)..n {
                let rj = self.bodies[j].radius + pad;
                let r = ri + rj;
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                let mut d = (a.pos + a.vel) - (b.pos + b.vel);
                let mut len = d.hypot();
                if len >= r {
                    continue;
                }
                if len == 0.0 {
                    d = jiggle(i * n + j);
                    len = d.hypot();
                }
                let k = (r - len) / len * strength;
                let push = d * k;
                let rj2 = rj * rj;
                let share = rj2 / (ri2 + rj2);
                self.bodies[i].vel += push * share;
                self.bodies[j].vel -= push * (1.0 - share);
            }
        }
    }

    fn apply_radial(&mut self, alpha: f64) {
        let strength = self.config.radial_strength;
        for b in &mut self.bodies {
            let d = b.pos - self.center;
            let r = d.hypot().max(1e-6);
            let target = self.config.radial_target(b.depth);
            let k = (target - r) * strength * alpha / r;
            b.vel += d * k;
        }
    }

    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let sum = self
            .bodies
            .iter()
            .fold(Vec2::ZERO, |acc, b| acc + b.pos.to_vec2());
        let mean = sum / self.bodies.len() as f64;
        let shift = (mean - self.center.to_vec2()) * self.config.center_strength;
        for b in &mut self.bodies {
            b.pos -= shift;
        }
    }

    /// Move the centering target, e.g. after a viewport resize, and reheat.
    pub fn recenter(&mut self, center: Point) {
        self.center = center;
        self.reheat();
    }

    /// Raise alpha back to the resume level so the layout restabilizes.
    pub fn reheat(&mut self) {
        self.alpha = self.alpha.max(self.config.resume_alpha);
    }

    /// Fix `id` at `pos` until [`unpin`](Self::unpin). Returns `false` if the
    /// node is not simulated.
    pub fn pin(&mut self, id: &GoalId, pos: Point) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let b = &mut self.bodies[i];
        b.pinned = Some(pos);
        b.pos = pos;
        b.vel = Vec2::ZERO;
        true
    }

    /// Release a pinned node.
    pub fn unpin(&mut self, id: &GoalId) {
        if let Some(&i) = self.index.get(id) {
            self.bodies[i].pinned = None;
        }
    }

    /// Whether `id` is pinned.
    pub fn is_pinned(&self, id: &GoalId) -> bool {
        self.index
            .get(id)
            .is_some_and(|&i| self.bodies[i].pinned.is_some())
    }

    /// Current position of `id`.
    pub fn position(&self, id: &GoalId) -> Option<Point> {
        self.index.get(id).map(|&i| self.bodies[i].pos)
    }

    /// Snapshot of every body's position.
    pub fn positions(&self) -> Positions {
        self.ids
            .iter()
            .zip(&self.bodies)
            .map(|(id, b)| (id.clone(), b.pos))
            .collect()
    }

    /// Current alpha.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// How the simulation was seeded.
    pub fn start(&self) -> Start {
        self.start
    }

    /// Centering target.
    pub fn center(&self) -> Point {
        self.center
    }

    /// True once alpha has cooled below the settling threshold.
    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min
    }

    /// Number of simulated bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// True if nothing is simulated.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Offset of the `k`-th seed on a golden-angle spiral.
fn phyllotaxis(k: usize) -> Vec2 {
    let angle = k as f64 * PI * (3.0 - 5.0_f64.sqrt());
    Vec2::from_angle(angle) * (SEED_RADIUS * (0.5 + k as f64).sqrt())
}

/// Tiny deterministic displacement for coincident bodies.
fn jiggle(k: usize) -> Vec2 {
    Vec2::from_angle(k as f64 * PI * (3.0 - 5.0_f64.sqrt())) * 1e-6
}
