use flock_core::{Agent, Config, FlockError, SimSettings, Simulator, UpdateOrder};
use glam::DVec2;

fn run(sim: &mut Simulator, steps: usize) {
    for _ in 0..steps {
        sim.step();
    }
}

#[test]
fn same_seed_gives_identical_trajectories() {
    let mut a = Simulator::initialize(40, 15.0, 10.0, Some(1234)).unwrap();
    let mut b = Simulator::initialize(40, 15.0, 10.0, Some(1234)).unwrap();

    for _ in 0..200 {
        a.step();
        b.step();
        assert_eq!(a.snapshot(), b.snapshot());
    }
}

#[test]
fn different_seeds_place_flocks_differently() {
    let a = Simulator::initialize(10, 15.0, 10.0, Some(1)).unwrap();
    let b = Simulator::initialize(10, 15.0, 10.0, Some(2)).unwrap();
    assert_ne!(a.snapshot(), b.snapshot());
}

#[test]
fn snapshot_length_matches_count_every_step() {
    for order in [UpdateOrder::Sequential, UpdateOrder::Synchronous] {
        let cfg = Config {
            update_order: order,
            ..Config::default()
        };
        let mut sim = Simulator::new(SimSettings::new(33, 15.0, 10.0, Some(5)), cfg).unwrap();
        for _ in 0..100 {
            sim.step();
            assert_eq!(sim.snapshot().len(), 33);
        }
    }
}

#[test]
fn snapshot_does_not_mutate_the_simulator() {
    let mut sim = Simulator::initialize(10, 15.0, 10.0, Some(9)).unwrap();
    run(&mut sim, 5);

    let agents_before = sim.agents().to_vec();
    let first = sim.snapshot();
    let second = sim.snapshot();

    assert_eq!(first, second);
    assert_eq!(sim.agents(), agents_before.as_slice());
    assert_eq!(sim.tick(), 5);
}

#[test]
fn snapshot_order_follows_agent_order() {
    let flock = vec![
        Agent::new(DVec2::new(1.0, 1.0), DVec2::ZERO),
        Agent::new(DVec2::new(5.0, 2.0), DVec2::ZERO),
        Agent::new(DVec2::new(9.0, 3.0), DVec2::ZERO),
    ];
    let mut sim = Simulator::from_agents(flock, 15.0, 10.0, Config::default()).unwrap();
    run(&mut sim, 3);

    let snap = sim.snapshot();
    for (p, a) in snap.iter().zip(sim.agents()) {
        assert_eq!(p, a.position);
    }
    assert!(snap.positions()[0].x < snap.positions()[1].x);
    assert!(snap.positions()[1].x < snap.positions()[2].x);
}

#[test]
fn agents_stay_near_the_arena() {
    // Reflection is lazy, so positions may overshoot by about one step's
    // travel but never run away.
    let cfg = Config {
        initial_velocity: DVec2::new(0.05, -0.04),
        ..Config::default()
    };
    let mut sim = Simulator::new(SimSettings::new(30, 15.0, 10.0, Some(3)), cfg).unwrap();
    let slack = 0.5;

    for _ in 0..1000 {
        sim.step();
        for p in sim.snapshot().iter() {
            assert!(p.x >= -slack && p.x <= 15.0 + slack, "x escaped: {p:?}");
            assert!(p.y >= -slack && p.y <= 10.0 + slack, "y escaped: {p:?}");
        }
    }
}

#[test]
fn overshooting_agent_heads_back_next_step() {
    let cfg = Config {
        alignment_factor: 0.0,
        cohesion_factor: 0.0,
        ..Config::default()
    };
    let flock = vec![Agent::new(DVec2::new(0.005, 5.0), DVec2::new(-0.02, 0.0))];
    let mut sim = Simulator::from_agents(flock, 15.0, 10.0, cfg).unwrap();

    sim.step();
    let p = sim.agents()[0].position;
    assert!(p.x < 0.0);
    assert!(sim.agents()[0].velocity.x > 0.0);

    sim.step();
    assert!(sim.agents()[0].position.x > p.x);
}

#[test]
fn lone_agent_keeps_initial_velocity() {
    let cfg = Config::default();
    let flock = vec![Agent::spawn(DVec2::new(7.0, 5.0), &cfg)];
    let mut sim = Simulator::from_agents(flock, 15.0, 10.0, cfg).unwrap();

    run(&mut sim, 10);

    assert_eq!(sim.agents()[0].velocity, DVec2::splat(1e-5));
}

#[test]
fn close_pair_is_pushed_apart_by_a_step() {
    let cfg = Config {
        alignment_factor: 0.0,
        cohesion_factor: 0.0,
        ..Config::default()
    };
    let flock = vec![
        Agent::new(DVec2::new(1.0, 1.0), DVec2::ZERO),
        Agent::new(DVec2::new(1.1, 1.0), DVec2::ZERO),
    ];
    let mut sim = Simulator::from_agents(flock, 15.0, 10.0, cfg).unwrap();

    sim.step();

    let a = sim.agents()[0];
    let b = sim.agents()[1];
    assert!(a.velocity.x < 0.0);
    assert!(b.velocity.x > 0.0);
    assert!(b.position.x - a.position.x > 0.1);
}

#[test]
fn update_orders_diverge_on_interacting_flocks() {
    let settings = SimSettings::new(25, 4.0, 4.0, Some(11));
    let mut seq = Simulator::new(settings, Config::default()).unwrap();
    let mut sync = Simulator::new(
        settings,
        Config {
            update_order: UpdateOrder::Synchronous,
            ..Config::default()
        },
    )
    .unwrap();
    assert_eq!(seq.snapshot(), sync.snapshot());

    run(&mut seq, 50);
    run(&mut sync, 50);

    assert_ne!(seq.snapshot(), sync.snapshot());
}

#[test]
fn coincident_flock_never_produces_nan() {
    let flock = vec![Agent::new(DVec2::new(5.0, 5.0), DVec2::ZERO); 8];
    for order in [UpdateOrder::Sequential, UpdateOrder::Synchronous] {
        let cfg = Config {
            update_order: order,
            ..Config::default()
        };
        let mut sim = Simulator::from_agents(flock.clone(), 15.0, 10.0, cfg).unwrap();

        let first = sim.step();
        assert!(first.degenerate_pairs > 0);
        run(&mut sim, 50);

        assert!(sim.snapshot().iter().all(|p| p.is_finite()));
    }
}

#[test]
fn invalid_configuration_is_reported() {
    let err = Simulator::initialize(0, 15.0, 10.0, Some(0)).unwrap_err();
    assert_eq!(err, FlockError::EmptyFlock);
    assert_eq!(err.to_string(), "agent count must be at least 1");

    let err = Simulator::initialize(3, 15.0, 0.0, Some(0)).unwrap_err();
    assert!(matches!(err, FlockError::InvalidArena { .. }));

    let cfg = Config {
        separation_factor: f64::NAN,
        ..Config::default()
    };
    let err = Simulator::new(SimSettings::new(3, 15.0, 10.0, None), cfg).unwrap_err();
    assert!(matches!(
        err,
        FlockError::InvalidParameter {
            name: "separation_factor",
            ..
        }
    ));
}
