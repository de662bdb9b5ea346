use crate::error::{MeshError, TickError};
use crate::V3;

/// Deformable triangle mesh stored as flat, index-stable arrays.
///
/// `positions` and `velocities` are indexed identically. Edge adjacency is
/// derived from `faces` once at construction and only rebuilt when the mesh
/// is replaced.
#[derive(Clone, Debug)]
pub struct Mesh {
	positions: Vec<V3>,
	velocities: Vec<V3>,
	faces: Vec<[usize; 3]>,
	adjacency: Vec<Vec<usize>>,
}

fn build_adjacency(len: usize, faces: &[[usize; 3]]) -> Vec<Vec<usize>> {
	let mut adjacency = vec![Vec::new(); len];
	for f in faces {
		for k in 0..3 {
			let a = f[k];
			let b = f[(k + 1) % 3];
			adjacency[a].push(b);
			adjacency[b].push(a);
		}
	}
	for list in adjacency.iter_mut() {
		list.sort_unstable();
		list.dedup();
	}
	adjacency
}

pub(crate) fn is_finite(p: &V3) -> bool {
	p.iter().all(|x| x.is_finite())
}

/// Signed volume of the tetrahedron (origin, p0, p1, p2).
pub fn tetra_volume(p0: V3, p1: V3, p2: V3) -> f32 {
	p0.dot(&p1.cross(&p2)) / 6.0
}

impl Mesh {
	pub fn new(
		positions: Vec<V3>,
		faces: Vec<[usize; 3]>,
	) -> Result<Self, MeshError> {
		let len = positions.len();
		if len == 0 {
			return Err(MeshError::Empty);
		}
		if let Some(id) = positions.iter().position(|p| !is_finite(p)) {
			return Err(MeshError::NonFinite(id));
		}
		for (id, f) in faces.iter().enumerate() {
			if let Some(&index) = f.iter().find(|&&i| i >= len) {
				return Err(MeshError::IndexOutOfRange {
					face: id,
					index,
					len,
				});
			}
			if f[0] == f[1] || f[1] == f[2] || f[0] == f[2] {
				return Err(MeshError::DegenerateFace(id));
			}
		}
		let adjacency = build_adjacency(len, &faces);
		Ok(Self {
			velocities: vec![V3::zeros(); len],
			positions,
			faces,
			adjacency,
		})
	}

	pub fn len(&self) -> usize {
		self.positions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	pub fn positions(&self) -> &[V3] {
		&self.positions
	}

	pub fn velocities(&self) -> &[V3] {
		&self.velocities
	}

	pub fn faces(&self) -> &[[usize; 3]] {
		&self.faces
	}

	pub fn neighbors(&self, id: usize) -> &[usize] {
		&self.adjacency[id]
	}

	pub fn adjacency(&self) -> &[Vec<usize>] {
		&self.adjacency
	}

	pub(crate) fn positions_mut(&mut self) -> &mut [V3] {
		&mut self.positions
	}

	/// Raw velocity storage. Callers may resize it; the engine detects and
	/// repairs length mismatches at the start of the next tick.
	pub fn velocities_mut(&mut self) -> &mut Vec<V3> {
		&mut self.velocities
	}

	pub(crate) fn geometry_mut(&mut self) -> (&mut [V3], &[[usize; 3]]) {
		(&mut self.positions, &self.faces)
	}

	pub fn set_positions(&mut self, positions: &[V3]) {
		self.positions.copy_from_slice(positions);
	}

	pub fn zero_velocities(&mut self) {
		self.velocities.iter_mut().for_each(|v| *v = V3::zeros());
	}

	pub fn max_speed(&self) -> f32 {
		self.velocities
			.iter()
			.map(|v| v.magnitude())
			.fold(0.0, f32::max)
	}

	/// Enclosed volume under the face winding; positive for outward
	/// counter-clockwise faces.
	pub fn signed_volume(&self) -> f32 {
		signed_volume(&self.positions, &self.faces)
	}

	pub fn centroid(&self) -> V3 {
		centroid(&self.positions)
	}

	pub fn check(&self) -> Result<(), TickError> {
		if self.velocities.len() != self.positions.len() {
			return Err(TickError::LengthMismatch {
				positions: self.positions.len(),
				velocities: self.velocities.len(),
			});
		}
		if let Some(id) = self.positions.iter().position(|p| !is_finite(p)) {
			return Err(TickError::NonFinite(id));
		}
		Ok(())
	}

	/// Bring velocities back to one entry per vertex. Missing entries are
	/// zero, surplus entries are dropped.
	pub fn resync(&mut self) {
		self.velocities.resize(self.positions.len(), V3::zeros());
	}
}

pub fn signed_volume(positions: &[V3], faces: &[[usize; 3]]) -> f32 {
	faces
		.iter()
		.map(|f| tetra_volume(positions[f[0]], positions[f[1]], positions[f[2]]))
		.sum()
}

pub fn centroid(positions: &[V3]) -> V3 {
	if positions.is_empty() {
		return V3::zeros();
	}
	positions.iter().sum::<V3>() / positions.len() as f32
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_tetra_volume() {
		let p0 = V3::new(1., 0., 0.);
		let p1 = V3::new(0., 1., 0.);
		let p2 = V3::new(0., 0., 1.);
		let a0 = tetra_volume(p0, p1, p2);
		let a1 = tetra_volume(p0, p2, p1);
		assert!((a0 - 1. / 6.).abs() < 1e-6);
		assert!((a0 + a1).abs() < 1e-6);
	}

	#[test]
	fn test_bad_faces() {
		let ps = vec![V3::zeros(), V3::x(), V3::y()];
		assert_eq!(
			Mesh::new(ps.clone(), vec![[0, 1, 3]]).unwrap_err(),
			MeshError::IndexOutOfRange {
				face: 0,
				index: 3,
				len: 3
			}
		);
		assert_eq!(
			Mesh::new(ps, vec![[0, 1, 1]]).unwrap_err(),
			MeshError::DegenerateFace(0)
		);
		assert_eq!(Mesh::new(vec![], vec![]).unwrap_err(), MeshError::Empty);
	}

	#[test]
	fn test_non_finite_rejected() {
		let mut ps = vec![V3::zeros(), V3::x(), V3::y(), V3::z()];
		ps[2][0] = f32::NAN;
		assert_eq!(
			Mesh::new(ps.clone(), vec![[0, 1, 2]]).unwrap_err(),
			MeshError::NonFinite(2)
		);
		ps[2] = V3::new(0.0, f32::INFINITY, 0.0);
		assert_eq!(
			Mesh::new(ps, vec![[0, 1, 3]]).unwrap_err(),
			MeshError::NonFinite(2)
		);
	}

	#[test]
	fn test_adjacency_dedup() {
		let ps = vec![V3::zeros(), V3::x(), V3::y(), V3::z()];
		let mesh = Mesh::new(ps, vec![[0, 1, 2], [0, 2, 3]]).unwrap();
		assert_eq!(mesh.neighbors(0), &[1, 2, 3]);
		assert_eq!(mesh.neighbors(1), &[0, 2]);
		assert_eq!(mesh.neighbors(2), &[0, 1, 3]);
	}

	#[test]
	fn test_resync() {
		let ps = vec![V3::zeros(), V3::x(), V3::y()];
		let mut mesh = Mesh::new(ps, vec![[0, 1, 2]]).unwrap();
		mesh.velocities_mut().pop();
		assert!(matches!(mesh.check(), Err(TickError::LengthMismatch { .. })));
		mesh.resync();
		assert!(mesh.check().is_ok());
		assert_eq!(mesh.velocities()[2], V3::zeros());
	}
}
