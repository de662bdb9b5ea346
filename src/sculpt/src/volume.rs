use crate::mesh::{centroid, signed_volume};
use crate::V3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Correction {
	/// Ratio already inside the bounds.
	None,
	/// Uniform rescale about the centroid.
	Scaled { ratio: f32, scale: f32 },
	/// The initial volume is zero; the guard does nothing.
	Disabled,
	/// Volume collapsed to zero or went non-finite; no uniform scale can
	/// fix it.
	Unrecoverable { ratio: f32 },
}

/// Keeps the current/initial volume ratio inside `bounds` by rescaling the
/// whole mesh about its centroid.
#[derive(Clone, Debug)]
pub struct VolumeGuard {
	initial: f32,
	bounds: [f32; 2],
	warned: bool,
}

impl VolumeGuard {
	pub fn new(positions: &[V3], faces: &[[usize; 3]], bounds: [f32; 2]) -> Self {
		Self {
			initial: signed_volume(positions, faces),
			bounds,
			warned: false,
		}
	}

	pub fn initial_volume(&self) -> f32 {
		self.initial
	}

	pub fn is_disabled(&self) -> bool {
		self.initial == 0.0 || !self.initial.is_finite()
	}

	pub fn ratio(&self, positions: &[V3], faces: &[[usize; 3]]) -> Option<f32> {
		if self.is_disabled() {
			return None;
		}
		Some(signed_volume(positions, faces) / self.initial)
	}

	/// Returns true exactly once for a degenerate mesh, so the caller can
	/// raise a single warning.
	pub fn take_warning(&mut self) -> bool {
		if self.is_disabled() && !self.warned {
			self.warned = true;
			return true;
		}
		false
	}

	pub fn apply(&self, positions: &mut [V3], faces: &[[usize; 3]]) -> Correction {
		let ratio = match self.ratio(positions, faces) {
			None => return Correction::Disabled,
			Some(r) => r,
		};
		let [lower, upper] = self.bounds;
		if (lower..=upper).contains(&ratio) {
			return Correction::None;
		}
		if ratio == 0.0 || !ratio.is_finite() {
			return Correction::Unrecoverable { ratio };
		}
		// a negative ratio gives a negative scale: reflection through the
		// centroid restores the winding
		let target = ratio.clamp(lower, upper);
		let scale = (target / ratio).cbrt();
		let c = centroid(positions);
		for p in positions.iter_mut() {
			*p = c + (*p - c) * scale;
		}
		Correction::Scaled { ratio, scale }
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::mesh_model::MeshModel;

	fn cube() -> MeshModel {
		MeshModel::new_cube(2.0)
	}

	#[test]
	fn test_within_bounds_untouched() {
		let m = cube();
		let guard = VolumeGuard::new(&m.positions, &m.faces, [0.8, 1.2]);
		let mut ps = m.positions.clone();
		for p in ps.iter_mut() {
			*p *= 1.05;
		}
		let before = ps.clone();
		assert_eq!(guard.apply(&mut ps, &m.faces), Correction::None);
		assert_eq!(ps, before);
	}

	#[test]
	fn test_inflated_mesh_clamped() {
		let m = cube().with_offset(V3::new(1.0, 2.0, 3.0));
		let guard = VolumeGuard::new(&m.positions, &m.faces, [0.8, 1.2]);
		let mut ps = m.positions.clone();
		// stretch along x only: ratio 2
		let c = centroid(&ps);
		for p in ps.iter_mut() {
			p[0] = c[0] + (p[0] - c[0]) * 2.0;
		}
		assert!(matches!(guard.apply(&mut ps, &m.faces), Correction::Scaled { .. }));
		let ratio = guard.ratio(&ps, &m.faces).unwrap();
		assert!((ratio - 1.2).abs() < 1e-4, "{}", ratio);
		assert!((centroid(&ps) - c).magnitude() < 1e-5);
	}

	#[test]
	fn test_crushed_mesh_clamped() {
		let m = cube();
		let guard = VolumeGuard::new(&m.positions, &m.faces, [0.8, 1.2]);
		let mut ps = m.positions.clone();
		for p in ps.iter_mut() {
			p[2] *= 0.25;
		}
		guard.apply(&mut ps, &m.faces);
		let ratio = guard.ratio(&ps, &m.faces).unwrap();
		assert!((ratio - 0.8).abs() < 1e-4, "{}", ratio);
	}

	#[test]
	fn test_degenerate_disables_once() {
		// flat square: zero volume
		let ps = vec![
			V3::new(0.0, 0.0, 0.0),
			V3::new(1.0, 0.0, 0.0),
			V3::new(1.0, 1.0, 0.0),
			V3::new(0.0, 1.0, 0.0),
		];
		let faces = vec![[0, 1, 2], [0, 2, 3]];
		let mut guard = VolumeGuard::new(&ps, &faces, [0.8, 1.2]);
		assert!(guard.is_disabled());
		assert!(guard.take_warning());
		assert!(!guard.take_warning());
		let mut moved = ps.clone();
		moved[0][2] = 5.0;
		let before = moved.clone();
		assert_eq!(guard.apply(&mut moved, &faces), Correction::Disabled);
		assert_eq!(moved, before);
	}

	#[test]
	fn test_inverted_mesh_reflected_back() {
		let m = cube().with_offset(V3::new(0.5, 0.0, -1.0));
		let guard = VolumeGuard::new(&m.positions, &m.faces, [0.8, 1.2]);
		let c = centroid(&m.positions);
		// every vertex pushed through the centroid and out the other side
		let mut ps: Vec<V3> = m.positions.iter().map(|p| c - (p - c) * 1.5).collect();
		let ratio = guard.ratio(&ps, &m.faces).unwrap();
		assert!(ratio < 0.0, "{}", ratio);
		let scale = match guard.apply(&mut ps, &m.faces) {
			Correction::Scaled { scale, .. } => scale,
			other => panic!("unexpected correction {:?}", other),
		};
		assert!(scale < 0.0);
		let ratio = guard.ratio(&ps, &m.faces).unwrap();
		assert!((ratio - 0.8).abs() < 1e-4, "{}", ratio);
		assert!((centroid(&ps) - c).magnitude() < 1e-5);
	}

	#[test]
	fn test_collapsed_mesh_left_alone() {
		let m = cube();
		let guard = VolumeGuard::new(&m.positions, &m.faces, [0.8, 1.2]);
		let mut ps = vec![V3::zeros(); m.positions.len()];
		assert_eq!(
			guard.apply(&mut ps, &m.faces),
			Correction::Unrecoverable { ratio: 0.0 }
		);
		assert!(ps.iter().all(|p| *p == V3::zeros()));
	}
}
