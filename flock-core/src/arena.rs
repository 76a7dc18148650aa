use glam::DVec2;

use crate::error::{Axis, FlockError};

/// The rectangular domain `[0, width] x [0, height]` agents move in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    width: f64,
    height: f64,
    margin: DVec2,
}

/// Which velocity components a call to [`Arena::reflect`] flipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reflection {
    pub x: bool,
    pub y: bool,
}

impl Reflection {
    pub fn any(self) -> bool {
        self.x || self.y
    }
}

impl Arena {
    /// Creates an arena, validating its extent and boundary margins.
    ///
    /// ### Parameters
    /// - `width`, `height` - Arena extent; both must be positive and finite.
    /// - `margin` - Per-axis distance below the upper edge at which
    ///   reflection triggers; each component must lie in `[0, extent)`.
    pub fn new(width: f64, height: f64, margin: DVec2) -> Result<Self, FlockError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(FlockError::InvalidArena { width, height });
        }
        for (axis, m, extent) in [(Axis::X, margin.x, width), (Axis::Y, margin.y, height)] {
            if !m.is_finite() || m < 0.0 || m >= extent {
                return Err(FlockError::InvalidMargin {
                    axis,
                    margin: m,
                    extent,
                });
            }
        }

        Ok(Self {
            width,
            height,
            margin,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn margin(&self) -> DVec2 {
        self.margin
    }

    /// Coordinates at or beyond which an agent is reflected back.
    pub fn upper_threshold(&self) -> DVec2 {
        DVec2::new(self.width, self.height) - self.margin
    }

    /// Returns `true` if `p` lies inside the closed arena rectangle.
    pub fn contains(&self, p: DVec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// Applies the lazy reflection policy to a candidate position.
    ///
    /// If a component of `candidate` is at or past the upper threshold, or
    /// at or below zero, the matching component of `velocity` is negated.
    /// The position itself is never clamped: the caller commits `candidate`
    /// unchanged and the flipped velocity brings the agent back on the
    /// following step.
    pub fn reflect(&self, candidate: DVec2, velocity: &mut DVec2) -> Reflection {
        let upper = self.upper_threshold();
        let x = candidate.x >= upper.x || candidate.x <= 0.0;
        let y = candidate.y >= upper.y || candidate.y <= 0.0;

        if x {
            velocity.x = -velocity.x;
        }
        if y {
            velocity.y = -velocity.y;
        }

        Reflection { x, y }
    }
}
