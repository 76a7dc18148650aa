/// Identifier for an agent in a [`crate::simulator::Simulator`].
///
/// This is an index into the simulator's agent list. Agents are never
/// added or removed during a run, so an id stays valid for the lifetime
/// of the `Simulator` that issued it.
pub type AgentId = usize;
