use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("{name} = {value} is out of range ({expected})")]
	OutOfRange {
		name: &'static str,
		value: f32,
		expected: &'static str,
	},
	#[error("history depth must be at least 1")]
	NoHistory,
	#[error("cannot read config: {0}")]
	Io(#[from] std::io::Error),
	#[error("cannot parse config: {0}")]
	Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshError {
	#[error("mesh has no vertices")]
	Empty,
	#[error("face {face} references vertex {index}, mesh has {len}")]
	IndexOutOfRange { face: usize, index: usize, len: usize },
	#[error("face {0} repeats a vertex")]
	DegenerateFace(usize),
	#[error("vertex {0} has a non-finite position")]
	NonFinite(usize),
}

/// Structural faults that abort a single tick.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TickError {
	#[error("{velocities} velocities for {positions} positions")]
	LengthMismatch { positions: usize, velocities: usize },
	#[error("vertex {0} has a non-finite position")]
	NonFinite(usize),
}
