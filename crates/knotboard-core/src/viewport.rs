//! Visible window onto the canvas, panned with the secondary button.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Viewport over a fixed-size canvas.
///
/// `translation` is the canvas offset relative to the viewport. It is never
/// positive and never pulls the canvas edge inside the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub translation: Vec2,
    /// Size of the visible area.
    pub size: Size,
    /// Size of the whole canvas.
    pub canvas: Size,
    /// Last pointer position of an active pan.
    #[serde(skip)]
    pan_anchor: Option<Point>,
}

impl Viewport {
    /// Create an unpanned viewport of `size` over a canvas of `canvas`.
    pub fn new(size: Size, canvas: Size) -> Self {
        Self {
            translation: Vec2::ZERO,
            size,
            canvas,
            pan_anchor: None,
        }
    }

    /// Transform from canvas to viewport coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.translation)
    }

    /// Convert a viewport point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        screen - self.translation
    }

    /// Convert a canvas point to viewport coordinates.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas + self.translation
    }

    /// Canvas area currently visible.
    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin_size(self.screen_to_canvas(Point::ZERO), self.size)
    }

    /// Most negative allowed translation.
    fn min_translation(&self) -> Vec2 {
        Vec2::new(
            -(self.canvas.width - self.size.width).max(0.0),
            -(self.canvas.height - self.size.height).max(0.0),
        )
    }

    /// Shift the canvas by `delta`, clamped to the canvas extent.
    pub fn pan_by(&mut self, delta: Vec2) {
        let min = self.min_translation();
        let t = self.translation + delta;
        self.translation = Vec2::new(t.x.clamp(min.x, 0.0), t.y.clamp(min.y, 0.0));
    }

    /// Start panning from a pointer position.
    pub fn begin_pan(&mut self, pointer: Point) {
        self.pan_anchor = Some(pointer);
    }

    /// Follow the pointer while panning; returns whether a pan is active.
    pub fn update_pan(&mut self, pointer: Point) -> bool {
        let Some(last) = self.pan_anchor else {
            return false;
        };
        self.pan_by(pointer - last);
        self.pan_anchor = Some(pointer);
        true
    }

    /// Stop panning.
    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    /// Whether a pan gesture is in progress.
    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Change the visible size, re-clamping the translation.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.pan_by(Vec2::ZERO);
    }
}
