use std::path::Path;

use gesture::GestureConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Above this vertex count the hash-grid index replaces the linear scan.
pub const SPATIAL_INDEX_CROSSOVER: usize = 2048;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	pub influence_radius: f32,
	pub force_strength: f32,
	/// Per-tick velocity multiplier, in (0, 1).
	pub damping: f32,
	/// Blend toward the neighbor average, in [0, 1].
	pub cohesion: f32,
	/// Allowed current/initial volume ratio.
	pub volume_bounds: [f32; 2],
	pub max_displacement: f32,
	pub timestep: f32,
	pub history_depth: usize,
	pub rest_epsilon: f32,
	pub zero_velocity_on_rewind: bool,
	pub spatial_index_crossover: usize,
	pub workspace_center: [f32; 3],
	pub workspace_scale: f32,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			influence_radius: 0.5,
			force_strength: 0.08,
			damping: 0.8,
			cohesion: 0.5,
			volume_bounds: [0.8, 1.2],
			max_displacement: 0.25,
			timestep: 1.0 / 30.0,
			history_depth: 32,
			rest_epsilon: 1e-4,
			zero_velocity_on_rewind: true,
			spatial_index_crossover: SPATIAL_INDEX_CROSSOVER,
			workspace_center: [0.0; 3],
			workspace_scale: 4.0,
		}
	}
}

fn check(
	name: &'static str,
	value: f32,
	ok: bool,
	expected: &'static str,
) -> Result<(), ConfigError> {
	if ok && value.is_finite() {
		Ok(())
	} else {
		Err(ConfigError::OutOfRange {
			name,
			value,
			expected,
		})
	}
}

impl EngineConfig {
	pub fn with_influence_radius(mut self, r: f32) -> Self {
		self.influence_radius = r;
		self
	}

	pub fn with_force_strength(mut self, k: f32) -> Self {
		self.force_strength = k;
		self
	}

	pub fn with_damping(mut self, d: f32) -> Self {
		self.damping = d;
		self
	}

	pub fn with_cohesion(mut self, c: f32) -> Self {
		self.cohesion = c;
		self
	}

	pub fn with_volume_bounds(mut self, lower: f32, upper: f32) -> Self {
		self.volume_bounds = [lower, upper];
		self
	}

	pub fn with_max_displacement(mut self, d: f32) -> Self {
		self.max_displacement = d;
		self
	}

	pub fn with_timestep(mut self, dt: f32) -> Self {
		self.timestep = dt;
		self
	}

	pub fn with_history_depth(mut self, depth: usize) -> Self {
		self.history_depth = depth;
		self
	}

	pub fn with_zero_velocity_on_rewind(mut self, on: bool) -> Self {
		self.zero_velocity_on_rewind = on;
		self
	}

	pub fn with_spatial_index_crossover(mut self, n: usize) -> Self {
		self.spatial_index_crossover = n;
		self
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		let [lower, upper] = self.volume_bounds;
		check(
			"influence_radius",
			self.influence_radius,
			self.influence_radius > 0.0,
			"> 0",
		)?;
		check(
			"force_strength",
			self.force_strength,
			self.force_strength >= 0.0,
			">= 0",
		)?;
		check(
			"damping",
			self.damping,
			self.damping > 0.0 && self.damping < 1.0,
			"(0, 1)",
		)?;
		check(
			"cohesion",
			self.cohesion,
			(0.0..=1.0).contains(&self.cohesion),
			"[0, 1]",
		)?;
		check("volume_bounds[0]", lower, lower > 0.0 && lower <= 1.0, "(0, 1]")?;
		check("volume_bounds[1]", upper, upper >= 1.0, ">= 1")?;
		check(
			"max_displacement",
			self.max_displacement,
			self.max_displacement > 0.0,
			"> 0",
		)?;
		check("timestep", self.timestep, self.timestep > 0.0, "> 0")?;
		check(
			"rest_epsilon",
			self.rest_epsilon,
			self.rest_epsilon >= 0.0,
			">= 0",
		)?;
		check(
			"workspace_scale",
			self.workspace_scale,
			self.workspace_scale > 0.0,
			"> 0",
		)?;
		if self.history_depth == 0 {
			return Err(ConfigError::NoHistory);
		}
		Ok(())
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
	pub engine: EngineConfig,
	pub gesture: GestureConfig,
	/// Target loop frequency in Hz.
	pub tick_rate: f32,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			engine: EngineConfig::default(),
			gesture: GestureConfig::default(),
			tick_rate: 30.0,
		}
	}
}

impl SessionConfig {
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path)?;
		Self::from_json(&text)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		self.engine.validate()?;
		check("tick_rate", self.tick_rate, self.tick_rate > 0.0, "> 0")?;
		let t = self.gesture.touch_threshold;
		check("touch_threshold", t, t > 0.0, "> 0")?;
		let h = self.gesture.hold_duration as f32;
		check("hold_duration", h, h >= 0.0, ">= 0")
	}
}
