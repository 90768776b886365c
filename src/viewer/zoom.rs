//! Zoom state for page rendering
//!
//! Holds the user zoom factor and keeps it inside a configurable
//! `[min_scale, max_scale]` window.

/// User zoom applied on top of the fit-to-surface scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    /// Current zoom factor (1.0 = 100%)
    factor: f32,
    min_scale: f32,
    max_scale: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::with_bounds(Self::MIN_SCALE, Self::MAX_SCALE)
    }
}

impl Zoom {
    /// Zoom in rate multiplier per step - 20%
    pub const ZOOM_IN_RATE: f32 = 1.2;
    /// Zoom out rate multiplier per step
    pub const ZOOM_OUT_RATE: f32 = 0.8;
    /// Default lower bound
    pub const MIN_SCALE: f32 = 0.5;
    /// Default upper bound
    pub const MAX_SCALE: f32 = 3.0;

    /// Create a zoom at 100% with the given bounds.
    ///
    /// Bounds are repaired rather than rejected: non-finite or non-positive
    /// values fall back to the defaults and swapped bounds are reordered.
    #[must_use]
    pub fn with_bounds(min_scale: f32, max_scale: f32) -> Self {
        let min = if min_scale.is_finite() && min_scale > 0.0 {
            min_scale
        } else {
            Self::MIN_SCALE
        };
        let max = if max_scale.is_finite() && max_scale > 0.0 {
            max_scale
        } else {
            Self::MAX_SCALE
        };
        let (min_scale, max_scale) = if min <= max { (min, max) } else { (max, min) };

        Self {
            factor: 1.0_f32.clamp(min_scale, max_scale),
            min_scale,
            max_scale,
        }
    }

    /// Returns the current zoom factor
    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min_scale, self.max_scale)
    }

    /// Multiply the factor, clamping the result. Returns true if it changed.
    pub fn apply(&mut self, multiplier: f32) -> bool {
        self.set(self.factor * multiplier)
    }

    /// Set an absolute factor, clamping the result. Returns true if it changed.
    pub fn set(&mut self, factor: f32) -> bool {
        let clamped = self.clamp_factor(factor);
        if (self.factor - clamped).abs() > f32::EPSILON {
            self.factor = clamped;
            true
        } else {
            false
        }
    }

    /// Back to 100%. Returns true if it changed.
    pub fn reset(&mut self) -> bool {
        self.set(1.0)
    }

    /// Zoom in by one step
    pub fn step_in(&mut self) -> bool {
        self.apply(Self::ZOOM_IN_RATE)
    }

    /// Zoom out by one step
    pub fn step_out(&mut self) -> bool {
        self.apply(Self::ZOOM_OUT_RATE)
    }

    /// Clamp factor to valid range, handling NaN/Inf
    pub fn clamp_factor(&self, factor: f32) -> f32 {
        if !factor.is_finite() {
            self.factor
        } else {
            factor.clamp(self.min_scale, self.max_scale)
        }
    }

    /// Display percentage, e.g. `120%`
    pub fn percent_label(&self) -> String {
        format!("{}%", (self.factor * 100.0).round() as i32)
    }
}
