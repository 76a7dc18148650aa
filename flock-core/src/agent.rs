use std::ptr;

use glam::DVec2;
use tracing::trace;

use crate::config::Config;

/// One flock member.
///
/// Agents have no identity beyond their slot: two agents may hold identical
/// positions and velocities. Rules that must skip "self" compare by
/// reference, so they are only meaningful when `self` is borrowed from the
/// same slice that is passed as `neighbors`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    pub position: DVec2,
    pub velocity: DVec2,
}

/// Outcome of a separation computation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Separation {
    /// Velocity change to apply.
    pub delta: DVec2,
    /// Neighbors skipped because they sat on top of the agent.
    pub degenerate: usize,
}

impl Agent {
    pub fn new(position: DVec2, velocity: DVec2) -> Self {
        Self { position, velocity }
    }

    /// Creates an agent at `position` with the configured initial velocity.
    pub fn spawn(position: DVec2, cfg: &Config) -> Self {
        Self::new(position, cfg.initial_velocity)
    }

    /// Returns `true` if `other` is this very agent (same memory slot).
    #[inline]
    fn is(&self, other: &Agent) -> bool {
        ptr::eq(self, other)
    }

    /// Iterates the neighbors that take part in mean/centroid rules.
    fn peers<'a>(
        &'a self,
        neighbors: &'a [Agent],
        include_self: bool,
    ) -> impl Iterator<Item = &'a Agent> + 'a {
        neighbors
            .iter()
            .filter(move |n| include_self || !self.is(n))
    }

    /// Velocity change that blends toward the mean velocity of `neighbors`.
    ///
    /// Returns `DVec2::ZERO` when no neighbor takes part.
    pub fn alignment_delta(&self, neighbors: &[Agent], cfg: &Config) -> DVec2 {
        let (sum, n) = self
            .peers(neighbors, cfg.include_self)
            .fold((DVec2::ZERO, 0usize), |(s, n), a| (s + a.velocity, n + 1));
        if n == 0 {
            return DVec2::ZERO;
        }
        let mean = sum / n as f64;
        (mean - self.velocity) * cfg.alignment_factor
    }

    /// Velocity change that steers toward the centroid of `neighbors`.
    ///
    /// Returns `DVec2::ZERO` when no neighbor takes part.
    pub fn cohesion_delta(&self, neighbors: &[Agent], cfg: &Config) -> DVec2 {
        let (sum, n) = self
            .peers(neighbors, cfg.include_self)
            .fold((DVec2::ZERO, 0usize), |(s, n), a| (s + a.position, n + 1));
        if n == 0 {
            return DVec2::ZERO;
        }
        let centroid = sum / n as f64;
        (centroid - self.position) * cfg.cohesion_factor
    }

    /// Velocity change that pushes away from every neighbor inside
    /// `cfg.separation_radius`.
    ///
    /// Each close neighbor contributes a vector of length
    /// `cfg.separation_factor` pointing from it toward this agent. The agent
    /// itself is skipped by identity. Neighbors at distance
    /// `<= cfg.separation_epsilon` have no defined direction; they are
    /// skipped and counted in [`Separation::degenerate`].
    pub fn separation_delta(&self, neighbors: &[Agent], cfg: &Config) -> Separation {
        self.separation_among(neighbors, cfg)
    }

    /// [`Agent::separation_delta`] over any sequence of agent references,
    /// such as the candidates of a [`crate::grid::NeighborGrid`] lookup.
    pub fn separation_among<'a, I>(&self, others: I, cfg: &Config) -> Separation
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        let mut out = Separation::default();

        for other in others {
            if self.is(other) {
                continue;
            }
            let away = self.position - other.position;
            let d = away.length();
            if d >= cfg.separation_radius {
                continue;
            }
            if d <= cfg.separation_epsilon {
                trace!(
                    x = self.position.x,
                    y = self.position.y,
                    distance = d,
                    "skipping coincident neighbor in separation"
                );
                out.degenerate += 1;
                continue;
            }
            out.delta += away * cfg.separation_factor / d;
        }

        out
    }

    /// Applies [`Agent::alignment_delta`] to this agent's velocity.
    pub fn align(&mut self, neighbors: &[Agent], cfg: &Config) {
        self.velocity += self.alignment_delta(neighbors, cfg);
    }

    /// Applies [`Agent::cohesion_delta`] to this agent's velocity.
    pub fn cohesion(&mut self, neighbors: &[Agent], cfg: &Config) {
        self.velocity += self.cohesion_delta(neighbors, cfg);
    }

    /// Applies [`Agent::separation_delta`] to this agent's velocity and
    /// returns the number of degenerate neighbors skipped.
    pub fn separation(&mut self, neighbors: &[Agent], cfg: &Config) -> usize {
        let sep = self.separation_delta(neighbors, cfg);
        self.velocity += sep.delta;
        sep.degenerate
    }

    /// Candidate position after one unit time step.
    #[inline]
    pub fn integrate(&self) -> DVec2 {
        self.position + self.velocity
    }

    #[inline]
    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
    }
}
