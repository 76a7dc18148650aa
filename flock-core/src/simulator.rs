use glam::DVec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::{
    agent::Agent,
    arena::Arena,
    config::{Config, SimSettings, UpdateOrder},
    delta_buffer::DeltaBuffer,
    error::FlockError,
    grid::NeighborGrid,
    snapshot::Snapshot,
    types::AgentId,
    update::{self, FlockSums, PassStats},
};

/// Summary of one call to [`Simulator::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepSummary {
    /// Tick reached by this step (the first step returns `1`).
    pub tick: u64,
    pub reflections_x: usize,
    pub reflections_y: usize,
    pub degenerate_pairs: usize,
}

impl StepSummary {
    fn new(tick: u64, stats: PassStats) -> Self {
        Self {
            tick,
            reflections_x: stats.reflections_x,
            reflections_y: stats.reflections_y,
            degenerate_pairs: stats.degenerate_pairs,
        }
    }
}

/// Owns a fixed-size flock and advances it one tick at a time.
///
/// The simulator is the only owner of agent state. Callers drive it by
/// calling [`Simulator::step`] at whatever cadence they like and read
/// positions back through [`Simulator::snapshot`].
#[derive(Debug)]
pub struct Simulator {
    agents: Vec<Agent>,
    arena: Arena,
    cfg: Config,
    seed: Option<u64>,
    tick: u64,

    grid: NeighborGrid,
    deltas: DeltaBuffer,
    scratch: Vec<AgentId>,
}

impl Simulator {
    /// Creates `count` agents at uniform random positions in
    /// `[0, width) x [0, height)` with the default [`Config`].
    ///
    /// ### Parameters
    /// - `count` - Number of agents; must be at least 1.
    /// - `width`, `height` - Arena extent; both must be positive.
    /// - `seed` - Placement seed. `None` picks one at random; it can be read
    ///   back with [`Simulator::seed`] to replay the run.
    ///
    /// ### Errors
    /// Returns a [`FlockError`] describing the first invalid input.
    pub fn initialize(
        count: usize,
        width: f64,
        height: f64,
        seed: Option<u64>,
    ) -> Result<Self, FlockError> {
        Self::new(
            SimSettings::new(count, width, height, seed),
            Config::default(),
        )
    }

    /// Creates a randomly placed flock from explicit settings and config.
    pub fn new(settings: SimSettings, cfg: Config) -> Result<Self, FlockError> {
        settings.validate()?;
        cfg.validate()?;
        let arena = Arena::new(settings.width, settings.height, cfg.boundary_margin)?;

        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let extent = settings.spawn_extent();
        let agents = (0..settings.count)
            .map(|_| {
                let x = rng.random_range(0.0..extent.x);
                let y = rng.random_range(0.0..extent.y);
                Agent::spawn(DVec2::new(x, y), &cfg)
            })
            .collect();

        info!(
            count = settings.count,
            width = settings.width,
            height = settings.height,
            seed,
            order = ?cfg.update_order,
            "initialized flock"
        );

        Ok(Self::from_parts(agents, arena, cfg, Some(seed)))
    }

    /// Creates a simulator from explicitly placed agents.
    ///
    /// The arena margins come from `cfg.boundary_margin`.
    pub fn from_agents(
        agents: Vec<Agent>,
        width: f64,
        height: f64,
        cfg: Config,
    ) -> Result<Self, FlockError> {
        if agents.is_empty() {
            return Err(FlockError::EmptyFlock);
        }
        cfg.validate()?;
        let arena = Arena::new(width, height, cfg.boundary_margin)?;

        for a in &agents {
            if !a.position.is_finite() {
                return Err(FlockError::InvalidParameter {
                    name: "agent position",
                    value: non_finite_component(a.position),
                });
            }
            if !a.velocity.is_finite() {
                return Err(FlockError::InvalidParameter {
                    name: "agent velocity",
                    value: non_finite_component(a.velocity),
                });
            }
        }

        debug!(count = agents.len(), width, height, "built flock from explicit agents");
        Ok(Self::from_parts(agents, arena, cfg, None))
    }

    fn from_parts(agents: Vec<Agent>, arena: Arena, cfg: Config, seed: Option<u64>) -> Self {
        let scratch = Vec::with_capacity(16);
        Self {
            grid: NeighborGrid::new(&arena, cfg.separation_radius),
            deltas: DeltaBuffer::with_len(agents.len()),
            agents,
            arena,
            cfg,
            seed,
            tick: 0,
            scratch,
        }
    }

    /// Advances the whole flock by one tick.
    pub fn step(&mut self) -> StepSummary {
        let stats = match self.cfg.update_order {
            UpdateOrder::Sequential => update::sequential_pass(
                &mut self.agents,
                &self.arena,
                &self.cfg,
                &mut self.grid,
                &mut self.scratch,
            ),
            UpdateOrder::Synchronous => update::synchronous_pass(
                &mut self.agents,
                &self.arena,
                &self.cfg,
                &mut self.grid,
                &mut self.scratch,
                &mut self.deltas,
            ),
        };
        self.tick += 1;

        let summary = StepSummary::new(self.tick, stats);
        if stats != PassStats::default() {
            debug!(
                tick = summary.tick,
                reflections_x = summary.reflections_x,
                reflections_y = summary.reflections_y,
                degenerate_pairs = summary.degenerate_pairs,
                "step"
            );
        }
        summary
    }

    /// Current positions in agent order.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.tick, self.agents.iter().map(|a| a.position).collect())
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seed used for initial placement, if the flock was placed randomly.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Replaces the rule configuration between steps.
    ///
    /// The flock is left untouched. On error the previous configuration
    /// stays in effect.
    pub fn set_config(&mut self, cfg: Config) -> Result<(), FlockError> {
        cfg.validate()?;
        let arena = Arena::new(self.arena.width(), self.arena.height(), cfg.boundary_margin)?;

        if cfg.separation_radius != self.cfg.separation_radius {
            self.grid = NeighborGrid::new(&arena, cfg.separation_radius);
        }
        self.arena = arena;
        self.cfg = cfg;
        Ok(())
    }

    /// Mean position of the flock.
    pub fn centroid(&self) -> DVec2 {
        let sums = FlockSums::of(&self.agents);
        sums.position / sums.count as f64
    }

    /// Mean velocity of the flock.
    pub fn mean_velocity(&self) -> DVec2 {
        let sums = FlockSums::of(&self.agents);
        sums.velocity / sums.count as f64
    }
}

fn non_finite_component(v: DVec2) -> f64 {
    if v.x.is_finite() { v.y } else { v.x }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still(x: f64, y: f64) -> Agent {
        Agent::new(DVec2::new(x, y), DVec2::ZERO)
    }

    #[test]
    fn initialize_places_agents_inside_arena() {
        let sim = Simulator::initialize(50, 15.0, 10.0, Some(7)).unwrap();

        assert_eq!(sim.agent_count(), 50);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.seed(), Some(7));
        for a in sim.agents() {
            assert!((0.0..15.0).contains(&a.position.x));
            assert!((0.0..10.0).contains(&a.position.y));
            assert_eq!(a.velocity, DVec2::splat(1e-5));
        }
    }

    #[test]
    fn unseeded_runs_record_their_seed() {
        let sim = Simulator::initialize(3, 15.0, 10.0, None).unwrap();
        let seed = sim.seed().unwrap();

        let replay = Simulator::initialize(3, 15.0, 10.0, Some(seed)).unwrap();
        assert_eq!(sim.snapshot(), replay.snapshot());
    }

    #[test]
    fn default_settings_use_inset_spawn_region() {
        let sim = Simulator::new(SimSettings::default(), Config::default()).unwrap();
        assert_eq!(sim.agent_count(), 20);
        for p in sim.snapshot().iter() {
            assert!(p.x < 14.0 && p.y < 9.0);
        }
    }

    #[test]
    fn invalid_inputs_fail_fast() {
        assert_eq!(
            Simulator::initialize(0, 15.0, 10.0, None).unwrap_err(),
            FlockError::EmptyFlock
        );
        assert!(matches!(
            Simulator::initialize(5, -1.0, 10.0, None),
            Err(FlockError::InvalidArena { .. })
        ));
        assert!(matches!(
            Simulator::from_agents(Vec::new(), 15.0, 10.0, Config::default()),
            Err(FlockError::EmptyFlock)
        ));
        assert!(matches!(
            Simulator::from_agents(
                vec![Agent::new(DVec2::new(f64::NAN, 1.0), DVec2::ZERO)],
                15.0,
                10.0,
                Config::default()
            ),
            Err(FlockError::InvalidParameter {
                name: "agent position",
                ..
            })
        ));
    }

    #[test]
    fn step_advances_tick_and_keeps_size() {
        let mut sim = Simulator::initialize(20, 15.0, 10.0, Some(0)).unwrap();
        for expected in 1..=10 {
            let summary = sim.step();
            assert_eq!(summary.tick, expected);
            assert_eq!(sim.snapshot().len(), 20);
        }
        assert_eq!(sim.snapshot().tick(), 10);
    }

    #[test]
    fn reflection_scenario() {
        let cfg = Config::default();
        let agents = vec![Agent::new(DVec2::new(14.95, 5.0), DVec2::new(0.01, 0.0))];
        let mut sim = Simulator::from_agents(agents, 15.0, 10.0, cfg).unwrap();

        let summary = sim.step();

        let a = sim.agents()[0];
        assert_eq!(summary.reflections_x, 1);
        assert!((a.velocity.x + 0.01).abs() < 1e-12);
        assert!((a.position.x - 14.96).abs() < 1e-12);

        let before = a.position.x;
        sim.step();
        assert!(sim.agents()[0].position.x < before);
    }

    #[test]
    fn two_agent_separation_scenario() {
        let flock = vec![still(1.0, 1.0), still(1.1, 1.0)];
        let sim = Simulator::from_agents(flock, 15.0, 10.0, Config::default()).unwrap();
        let cfg = *sim.config();
        let agents = sim.agents();

        let a = agents[0].separation_delta(agents, &cfg).delta;
        let b = agents[1].separation_delta(agents, &cfg).delta;

        assert!(a.x < 0.0);
        assert!(b.x > 0.0);
    }

    #[test]
    fn coincident_agents_are_reported_in_summary() {
        let flock = vec![still(3.0, 3.0), still(3.0, 3.0), still(9.0, 9.0)];
        let mut sim = Simulator::from_agents(flock, 15.0, 10.0, Config::default()).unwrap();

        let summary = sim.step();

        // Agent 0 sees agent 1 on top of it. Agent 1 then sees agent 0,
        // which has moved by at most its tiny velocity.
        assert!(summary.degenerate_pairs >= 1);
        assert!(sim.agents().iter().all(|a| a.velocity.is_finite()));
    }

    #[test]
    fn set_config_rejects_bad_values_and_keeps_old() {
        let mut sim = Simulator::initialize(5, 15.0, 10.0, Some(1)).unwrap();
        let bad = Config {
            boundary_margin: DVec2::new(20.0, 0.2),
            ..Config::default()
        };

        assert!(sim.set_config(bad).is_err());
        assert_eq!(*sim.config(), Config::default());

        let good = Config {
            separation_radius: 1.0,
            update_order: UpdateOrder::Synchronous,
            ..Config::default()
        };
        sim.set_config(good).unwrap();
        assert_eq!(sim.config().separation_radius, 1.0);
        sim.step();
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn centroid_and_mean_velocity() {
        let flock = vec![
            Agent::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0)),
            Agent::new(DVec2::new(2.0, 4.0), DVec2::new(0.0, 1.0)),
        ];
        let sim = Simulator::from_agents(flock, 15.0, 10.0, Config::default()).unwrap();

        assert_eq!(sim.centroid(), DVec2::new(1.0, 2.0));
        assert_eq!(sim.mean_velocity(), DVec2::new(0.5, 0.5));
    }
}
