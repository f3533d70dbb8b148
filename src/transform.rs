//! Per-image geometric state: rotation plus independent mirror flags.
//!
//! Rotation is stored in degrees and reduced with a truncating modulo after
//! every update, so it stays in `(-360, 360)` and keeps its sign. Mirroring is
//! a scale of `+1` or `-1` per axis.
//!
//! A positive rotation applied to an image mirrored on exactly one axis turns
//! the *visual* result the other way. [`TransformState::rotate`] compensates by
//! multiplying the delta with `sign(scale_x * scale_y)`, so a "rotate
//! clockwise" gesture always looks clockwise on screen.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformState {
    rotation: f32,
    scale_x: i8,
    scale_y: i8,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale_x: 1,
            scale_y: 1,
        }
    }
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotation in degrees, within `(-360, 360)`.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Horizontal mirror, `1` or `-1`.
    pub fn scale_x(&self) -> i8 {
        self.scale_x
    }

    /// Vertical mirror, `1` or `-1`.
    pub fn scale_y(&self) -> i8 {
        self.scale_y
    }

    /// Rotate by `delta_degrees`; a non-finite delta is ignored.
    pub fn rotate(&mut self, delta_degrees: f32) {
        if !delta_degrees.is_finite() {
            log::warn!("ignoring non-finite rotation {delta_degrees}");
            return;
        }
        let sign = f32::from(self.scale_x * self.scale_y);
        self.rotation = (self.rotation + delta_degrees * sign) % 360.0;
    }

    pub fn flip_horizontal(&mut self) {
        self.scale_x = -self.scale_x;
    }

    pub fn flip_vertical(&mut self) {
        self.scale_y = -self.scale_y;
    }

    /// Mirrored on exactly one axis (the case where rotation is compensated).
    pub fn is_mirrored(&self) -> bool {
        self.scale_x * self.scale_y < 0
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == 0.0 && self.scale_x == 1 && self.scale_y == 1
    }
}
