use glam::DVec2;

/// Read-only copy of every agent position at one tick.
///
/// Positions are in agent creation order, so `positions()[i]` is always
/// agent `i`. Rendering code can hold on to a snapshot while the simulator
/// keeps stepping.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    tick: u64,
    positions: Vec<DVec2>,
}

impl Snapshot {
    pub fn new(tick: u64, positions: Vec<DVec2>) -> Self {
        Self { tick, positions }
    }

    /// Number of completed steps when the snapshot was taken.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn positions(&self) -> &[DVec2] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.positions.iter().copied()
    }

    /// Positions as plain `(x, y)` pairs.
    pub fn to_tuples(&self) -> Vec<(f64, f64)> {
        self.iter().map(|p| (p.x, p.y)).collect()
    }
}
