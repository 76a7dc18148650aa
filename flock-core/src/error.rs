use thiserror::Error;

/// Arena axis named in boundary-related errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Errors that can occur when constructing a simulator.
///
/// All variants describe an invalid configuration; once a
/// [`crate::simulator::Simulator`] exists, stepping cannot fail.
#[derive(Debug, Error, PartialEq)]
pub enum FlockError {
    #[error("agent count must be at least 1")]
    EmptyFlock,
    #[error("arena dimensions must be positive and finite, got {width} x {height}")]
    InvalidArena { width: f64, height: f64 },
    #[error("boundary margin on {axis} must be in [0, {extent}), got {margin}")]
    InvalidMargin { axis: Axis, margin: f64, extent: f64 },
    #[error("spawn inset leaves no room on {axis}: inset {inset}, extent {extent}")]
    InvalidSpawnInset { axis: Axis, inset: f64, extent: f64 },
    #[error("parameter `{name}` is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
