use glam::DVec2;

use crate::error::{Axis, FlockError};

/// How a step reads the flock while updating it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateOrder {
    /// Agents are updated in place, in index order. Rule computations for
    /// agent `i` see the already-updated state of agents `0..i`.
    #[default]
    Sequential,
    /// Every agent's rule deltas are computed from the flock as it stood at
    /// the start of the step, then all agents are committed together.
    Synchronous,
}

/// Tunable parameters of the flocking rules and boundary policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub alignment_factor: f64,
    pub cohesion_factor: f64,
    pub separation_factor: f64,
    /// Neighbors strictly closer than this are repelled.
    pub separation_radius: f64,
    /// Neighbors closer than this are treated as coincident and ignored by
    /// separation.
    pub separation_epsilon: f64,
    /// Whether an agent counts itself when computing the flock's mean
    /// velocity and centroid.
    pub include_self: bool,
    pub update_order: UpdateOrder,
    pub initial_velocity: DVec2,
    /// Distance below the upper arena edge at which reflection triggers,
    /// per axis.
    pub boundary_margin: DVec2,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alignment_factor: 1e-4,
            cohesion_factor: 1e-4,
            separation_factor: 1e-4,
            separation_radius: 0.5,
            separation_epsilon: 1e-12,
            include_self: true,
            update_order: UpdateOrder::Sequential,
            initial_velocity: DVec2::splat(1e-5),
            boundary_margin: DVec2::new(0.1, 0.2),
        }
    }
}

impl Config {
    /// Checks that every rule parameter is finite and in range.
    ///
    /// Boundary margins are checked against the arena in
    /// [`crate::arena::Arena::new`], since their valid range depends on it.
    pub fn validate(&self) -> Result<(), FlockError> {
        let non_negative = [
            ("alignment_factor", self.alignment_factor),
            ("cohesion_factor", self.cohesion_factor),
            ("separation_factor", self.separation_factor),
            ("separation_radius", self.separation_radius),
            ("separation_epsilon", self.separation_epsilon),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FlockError::InvalidParameter { name, value });
            }
        }

        let finite = [
            ("initial_velocity.x", self.initial_velocity.x),
            ("initial_velocity.y", self.initial_velocity.y),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(FlockError::InvalidParameter { name, value });
            }
        }

        Ok(())
    }
}

/// Size, extent and seeding of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimSettings {
    pub count: usize,
    pub width: f64,
    pub height: f64,
    /// Seed for initial placement. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Distance kept clear of the upper edges when placing agents.
    /// Positions are sampled from `[0, width - inset.x) x [0, height - inset.y)`.
    pub spawn_inset: DVec2,
}

impl SimSettings {
    /// Settings that place agents anywhere in `[0, width) x [0, height)`.
    pub fn new(count: usize, width: f64, height: f64, seed: Option<u64>) -> Self {
        Self {
            count,
            width,
            height,
            seed,
            spawn_inset: DVec2::ZERO,
        }
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        if self.count == 0 {
            return Err(FlockError::EmptyFlock);
        }

        let (w, h) = (self.width, self.height);
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(FlockError::InvalidArena {
                width: w,
                height: h,
            });
        }

        for (axis, inset, extent) in [
            (Axis::X, self.spawn_inset.x, w),
            (Axis::Y, self.spawn_inset.y, h),
        ] {
            if !inset.is_finite() || inset < 0.0 || inset >= extent {
                return Err(FlockError::InvalidSpawnInset {
                    axis,
                    inset,
                    extent,
                });
            }
        }

        Ok(())
    }

    /// Upper corner of the region initial positions are drawn from.
    pub fn spawn_extent(&self) -> DVec2 {
        DVec2::new(self.width, self.height) - self.spawn_inset
    }
}

impl Default for SimSettings {
    /// Twenty agents on a 15 x 10 arena, seeded with `0`, spawned away from
    /// the upper edges.
    fn default() -> Self {
        Self {
            count: 20,
            width: 15.0,
            height: 10.0,
            seed: Some(0),
            spawn_inset: DVec2::new(1.0, 1.0),
        }
    }
}
