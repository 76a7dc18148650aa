//! Per-step update passes over the flock.
//!
//! A step runs exactly one of:
//! 1. [`sequential_pass`] - agents are updated in place, in index order;
//!    each agent's rules read the live state of the agents before it.
//! 2. [`synchronous_pass`] - all rule deltas are computed against the flock
//!    as it stood when the step began, collected in a [`DeltaBuffer`], and
//!    then committed together.
//!
//! Both passes share the same per-agent tail: integrate, reflect off the
//! arena boundary, commit the position.
//!
//! Alignment and cohesion read flock-wide means. Instead of rescanning the
//! flock for every agent, the passes keep running [`FlockSums`] that are
//! patched whenever an agent's velocity or position changes. Separation only
//! looks at candidates from a [`NeighborGrid`].

use glam::DVec2;

use crate::{
    agent::Agent, arena::Arena, config::Config, delta_buffer::DeltaBuffer, grid::NeighborGrid,
    types::AgentId,
};

/// Counters gathered during one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Agents whose x velocity was flipped by the boundary.
    pub reflections_x: usize,
    /// Agents whose y velocity was flipped by the boundary.
    pub reflections_y: usize,
    /// Coincident neighbor pairs skipped by separation.
    pub degenerate_pairs: usize,
}

/// Running totals of velocity and position over the whole flock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlockSums {
    pub velocity: DVec2,
    pub position: DVec2,
    pub count: usize,
}

impl FlockSums {
    /// Sums `agents` in index order.
    pub fn of(agents: &[Agent]) -> Self {
        agents.iter().fold(
            Self {
                velocity: DVec2::ZERO,
                position: DVec2::ZERO,
                count: 0,
            },
            |s, a| Self {
                velocity: s.velocity + a.velocity,
                position: s.position + a.position,
                count: s.count + 1,
            },
        )
    }

    /// Mean of `total` over the peers of an agent whose own contribution is
    /// `own`, or `None` if it has no peers.
    fn peer_mean(&self, total: DVec2, own: DVec2, include_self: bool) -> Option<DVec2> {
        if include_self {
            (self.count > 0).then(|| total / self.count as f64)
        } else {
            (self.count > 1).then(|| (total - own) / (self.count - 1) as f64)
        }
    }

    /// Same value as [`Agent::alignment_delta`] against the summed flock.
    ///
    /// `agent` must be a member of the flock whose current velocity is
    /// already reflected in `self.velocity`.
    pub fn alignment_delta(&self, agent: &Agent, cfg: &Config) -> DVec2 {
        self.peer_mean(self.velocity, agent.velocity, cfg.include_self)
            .map_or(DVec2::ZERO, |mean| {
                (mean - agent.velocity) * cfg.alignment_factor
            })
    }

    /// Same value as [`Agent::cohesion_delta`] against the summed flock.
    pub fn cohesion_delta(&self, agent: &Agent, cfg: &Config) -> DVec2 {
        self.peer_mean(self.position, agent.position, cfg.include_self)
            .map_or(DVec2::ZERO, |centroid| {
                (centroid - agent.position) * cfg.cohesion_factor
            })
    }

    #[inline]
    fn nudge_velocity(&mut self, agent: &mut Agent, delta: DVec2) {
        agent.velocity += delta;
        self.velocity += delta;
    }
}

/// Integrates `agent`, reflects it off the arena and commits the new position.
///
/// Returns the committed position.
fn advance(agent: &mut Agent, arena: &Arena, stats: &mut PassStats) -> DVec2 {
    let next = agent.integrate();
    let r = arena.reflect(next, &mut agent.velocity);
    stats.reflections_x += usize::from(r.x);
    stats.reflections_y += usize::from(r.y);
    agent.set_position(next);
    next
}

/// Updates every agent in place, in index order.
///
/// For each agent:
///
/// 1. Separation against the grid candidates around it; the velocity change
///    is committed immediately.
/// 2. Alignment against the flock's mean velocity, which already includes
///    the agent's own post-separation velocity and every earlier agent's
///    updated velocity. Committed immediately.
/// 3. Cohesion against the flock's centroid, with earlier agents already
///    moved. Committed immediately.
/// 4. Integrate, reflect and commit the position, updating the grid and
///    running sums so later agents observe the move.
///
/// The result matches applying [`Agent::separation`], [`Agent::align`] and
/// [`Agent::cohesion`] against the whole live flock, up to floating-point
/// rounding in the running means.
///
/// ### Parameters
/// - `agents` - The flock; mutated in place.
/// - `arena` - Bounds used for reflection.
/// - `cfg` - Rule factors and neighbor policy.
/// - `grid` - Neighbor grid; rebuilt from `agents` at the start of the pass.
/// - `scratch` - Reusable buffer for candidate ids.
pub fn sequential_pass(
    agents: &mut [Agent],
    arena: &Arena,
    cfg: &Config,
    grid: &mut NeighborGrid,
    scratch: &mut Vec<AgentId>,
) -> PassStats {
    let mut stats = PassStats::default();
    let mut sums = FlockSums::of(agents);
    grid.rebuild(agents);

    for id in 0..agents.len() {
        let sep = {
            let flock: &[Agent] = agents;
            let me = &flock[id];
            grid.candidates(me.position, scratch);
            me.separation_among(scratch.iter().map(|&j| &flock[j]), cfg)
        };
        stats.degenerate_pairs += sep.degenerate;
        sums.nudge_velocity(&mut agents[id], sep.delta);

        let d = sums.alignment_delta(&agents[id], cfg);
        sums.nudge_velocity(&mut agents[id], d);

        let d = sums.cohesion_delta(&agents[id], cfg);
        sums.nudge_velocity(&mut agents[id], d);

        let agent = &mut agents[id];
        let (from, v_before) = (agent.position, agent.velocity);
        let to = advance(agent, arena, &mut stats);

        sums.velocity += agent.velocity - v_before;
        sums.position += to - from;
        grid.relocate(id, from, to);
    }

    stats
}

/// Computes every agent's rule deltas from the unchanged flock, then
/// commits them all.
///
/// Each agent's separation, alignment and cohesion read the state at the
/// start of the step, including the agent's own starting velocity, so the
/// outcome does not depend on agent order. This produces different
/// trajectories from [`sequential_pass`].
///
/// ### Parameters
/// - `agents` - The flock; mutated only in the commit phase.
/// - `arena` - Bounds used for reflection.
/// - `cfg` - Rule factors and neighbor policy.
/// - `grid` - Neighbor grid; rebuilt from `agents` at the start of the pass.
/// - `scratch` - Reusable buffer for candidate ids.
/// - `deltas` - Per-agent accumulator; resized and cleared here.
pub fn synchronous_pass(
    agents: &mut [Agent],
    arena: &Arena,
    cfg: &Config,
    grid: &mut NeighborGrid,
    scratch: &mut Vec<AgentId>,
    deltas: &mut DeltaBuffer,
) -> PassStats {
    let mut stats = PassStats::default();
    let sums = FlockSums::of(agents);
    grid.rebuild(agents);
    deltas.ensure_len(agents.len());

    let flock: &[Agent] = agents;
    for (id, me) in flock.iter().enumerate() {
        grid.candidates(me.position, scratch);
        let sep = me.separation_among(scratch.iter().map(|&j| &flock[j]), cfg);
        stats.degenerate_pairs += sep.degenerate;

        deltas.add(id, sep.delta);
        deltas.add(id, sums.alignment_delta(me, cfg));
        deltas.add(id, sums.cohesion_delta(me, cfg));
    }

    for (id, agent) in agents.iter_mut().enumerate() {
        agent.velocity += deltas.get(id);
        advance(agent, arena, &mut stats);
    }

    stats
}
