use crate::types::AgentId;
use glam::DVec2;

/// Scratch buffer that accumulates a velocity change per agent.
///
/// Used by the synchronous update pass: every agent's rule deltas are
/// written here while the flock is read unchanged, and only then applied.
/// `delta[i]` corresponds to agent `i`.
#[derive(Debug, Default)]
pub struct DeltaBuffer {
    delta: Vec<DVec2>,
}

impl DeltaBuffer {
    /// Creates a buffer for `len` agents with every delta set to zero.
    pub fn with_len(len: usize) -> Self {
        Self {
            delta: vec![DVec2::ZERO; len],
        }
    }

    /// Ensures the buffer holds exactly `len` entries, all zero.
    ///
    /// Entries are cleared even when the length already matches.
    pub fn ensure_len(&mut self, len: usize) {
        if self.delta.len() != len {
            self.delta.resize(len, DVec2::ZERO);
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        self.delta.fill(DVec2::ZERO);
    }

    pub fn len(&self) -> usize {
        self.delta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delta.is_empty()
    }

    /// Adds `d` to the accumulated delta of agent `id`.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add(&mut self, id: AgentId, d: DVec2) {
        self.delta[id] += d;
    }

    /// Accumulated delta for agent `id`.
    #[inline]
    pub fn get(&self, id: AgentId) -> DVec2 {
        self.delta[id]
    }
}
