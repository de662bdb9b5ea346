use gesture::{Command, Finger, GestureEvent};
use protocol::hand::Hand;

use crate::V3;

/// Maps normalized tracker coordinates (x right, y down, z toward the
/// camera negative) into mesh world space.
#[derive(Clone, Copy, Debug)]
pub struct ControlMapper {
	world_center: V3,
	scale: f32,
}

impl Default for ControlMapper {
	fn default() -> Self {
		Self {
			world_center: V3::zeros(),
			scale: 4.0,
		}
	}
}

impl ControlMapper {
	pub fn new(world_center: [f32; 3], scale: f32) -> Self {
		Self {
			world_center: world_center.into(),
			scale,
		}
	}

	pub fn s2w(&self, pos: V3) -> V3 {
		let result = V3::new(pos[0] - 0.5, 0.5 - pos[1], -pos[2]) * self.scale;
		result + self.world_center
	}

	/// Index fingertips of the present hands while sculpting, Left first.
	pub fn control_points(&self, event: &GestureEvent) -> Vec<V3> {
		if event.command != Command::Sculpt {
			return Vec::new();
		}
		Hand::ORDER
			.iter()
			.filter_map(|&hand| event.tips(hand))
			.map(|tips| self.s2w(tips.tip(Finger::Index)))
			.collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use gesture::Fingertips;

	#[test]
	fn test_s2w() {
		let m = ControlMapper::new([1.0, 0.0, 0.0], 2.0);
		assert_eq!(m.s2w(V3::new(0.5, 0.5, 0.0)), V3::new(1.0, 0.0, 0.0));
		assert_eq!(m.s2w(V3::new(1.0, 0.0, 0.25)), V3::new(2.0, 1.0, -0.5));
	}

	#[test]
	fn test_only_sculpt_yields_points() {
		let m = ControlMapper::default();
		let tips = Fingertips([V3::new(0.5, 0.5, 0.0); 5]);
		let mut event = GestureEvent::with_command(Command::Orbit);
		event.left = Some(tips);
		event.right = Some(tips);
		assert!(m.control_points(&event).is_empty());
		event.command = Command::Sculpt;
		assert_eq!(m.control_points(&event).len(), 2);
		event.left = None;
		assert_eq!(m.control_points(&event), vec![V3::zeros()]);
	}
}
