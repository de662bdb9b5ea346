// pr_model: Physical model for rendering

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStatus {
	#[default]
	Idle,
	Deforming,
	Settling,
	Rewinding,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PrModel {
	pub positions: Vec<[f32; 3]>,
	pub faces: Vec<[usize; 3]>,
	pub status: EngineStatus,
	pub notices: Vec<String>,
}
