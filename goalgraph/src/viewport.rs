// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera transform between world and screen space.

use kurbo::{Affine, Point, Size, Vec2};

/// Uniform zoom followed by a translation: `screen = world * zoom + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    zoom: f64,
    offset: Vec2,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.1, 4.0)
    }
}

impl Viewport {
    /// Identity viewport with the given zoom limits.
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::ZERO,
            min_zoom,
            max_zoom,
        }
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current translation.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Map a screen point into world space.
    pub fn screen_to_world(&self, p: Point) -> Point {
        ((p.to_vec2() - self.offset) / self.zoom).to_point()
    }

    /// Map a world point into screen space.
    pub fn world_to_screen(&self, p: Point) -> Point {
        (p.to_vec2() * self.zoom + self.offset).to_point()
    }

    /// Shift the view by `delta` screen units.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom by `factor`, keeping the world point under `anchor`
    /// (a screen point) fixed. The result is clamped to the zoom limits.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let world = self.screen_to_world(anchor);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        self.offset = anchor.to_vec2() - world.to_vec2() * self.zoom;
    }

    /// Pan so `world` sits at the center of a viewport of `size`, keeping the zoom.
    pub fn center_on(&mut self, world: Point, size: Size) {
        let center = Vec2::new(size.width * 0.5, size.height * 0.5);
        self.offset = center - world.to_vec2() * self.zoom;
    }

    /// Back to the identity transform.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.offset = Vec2::ZERO;
    }

    /// Whether this is the identity transform.
    pub fn is_identity(&self) -> bool {
        self.zoom == 1.0 && self.offset == Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_and_world_round_trip() {
        let mut v = Viewport::default();
        v.pan(Vec2::new(30.0, -10.0));
        v.zoom_at(Point::new(100.0, 100.0), 2.0);
        let p = Point::new(12.5, 40.0);
        let back = v.screen_to_world(v.world_to_screen(p));
        assert!((back - p).hypot() < 1e-9);
        assert_eq!(v.transform() * p, v.world_to_screen(p));
    }

    #[test]
    fn zoom_keeps_anchor_fixed_and_clamps() {
        let mut v = Viewport::default();
        let anchor = Point::new(200.0, 150.0);
        let before = v.screen_to_world(anchor);
        v.zoom_at(anchor, 3.0);
        assert!((v.screen_to_world(anchor) - before).hypot() < 1e-9);
        v.zoom_at(anchor, 100.0);
        assert_eq!(v.zoom(), 4.0);
    }

    #[test]
    fn center_on_puts_point_mid_screen() {
        let mut v = Viewport::default();
        v.zoom_at(Point::ZERO, 2.0);
        v.center_on(Point::new(50.0, 50.0), Size::new(800.0, 600.0));
        assert_eq!(v.world_to_screen(Point::new(50.0, 50.0)), Point::new(400.0, 300.0));
        v.reset();
        assert!(v.is_identity());
    }
}
