use fnv::FnvHashMap;

use crate::error::MeshError;
use crate::mesh::Mesh;
use crate::V3;

/// Mesh template: plain geometry before it becomes a simulated arena.
#[derive(Clone, Debug, Default)]
pub struct MeshModel {
	pub positions: Vec<V3>,
	pub faces: Vec<[usize; 3]>,
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
	[0, 11, 5],
	[0, 5, 1],
	[0, 1, 7],
	[0, 7, 10],
	[0, 10, 11],
	[1, 5, 9],
	[5, 11, 4],
	[11, 10, 2],
	[10, 7, 6],
	[7, 1, 8],
	[3, 9, 4],
	[3, 4, 2],
	[3, 2, 6],
	[3, 6, 8],
	[3, 8, 9],
	[4, 9, 5],
	[2, 4, 11],
	[6, 2, 10],
	[8, 6, 7],
	[9, 8, 1],
];

impl MeshModel {
	/// Geodesic sphere; `subdivisions = 1` gives the 42-vertex sphere.
	pub fn new_icosphere(subdivisions: usize, radius: f32) -> Self {
		let t = (1.0 + 5f32.sqrt()) / 2.0;
		let mut positions: Vec<V3> = [
			[-1., t, 0.],
			[1., t, 0.],
			[-1., -t, 0.],
			[1., -t, 0.],
			[0., -1., t],
			[0., 1., t],
			[0., -1., -t],
			[0., 1., -t],
			[t, 0., -1.],
			[t, 0., 1.],
			[-t, 0., -1.],
			[-t, 0., 1.],
		]
		.iter()
		.map(|p| V3::new(p[0], p[1], p[2]).normalize())
		.collect();
		let mut faces = ICOSAHEDRON_FACES.to_vec();
		for _ in 0..subdivisions {
			let mut midpoints: FnvHashMap<(usize, usize), usize> =
				FnvHashMap::default();
			let mut midpoint = |a: usize, b: usize| {
				let key = (a.min(b), a.max(b));
				*midpoints.entry(key).or_insert_with(|| {
					let p = ((positions[a] + positions[b]) * 0.5).normalize();
					positions.push(p);
					positions.len() - 1
				})
			};
			let mut next = Vec::with_capacity(faces.len() * 4);
			for [a, b, c] in faces {
				let ab = midpoint(a, b);
				let bc = midpoint(b, c);
				let ca = midpoint(c, a);
				next.push([a, ab, ca]);
				next.push([b, bc, ab]);
				next.push([c, ca, bc]);
				next.push([ab, bc, ca]);
			}
			faces = next;
		}
		for p in positions.iter_mut() {
			*p *= radius;
		}
		Self { positions, faces }
	}

	/// Axis-aligned cube centered at the origin.
	pub fn new_cube(size: f32) -> Self {
		let h = size / 2.0;
		let positions = (0..8)
			.map(|i| {
				V3::new(
					if i & 1 == 0 { -h } else { h },
					if i & 2 == 0 { -h } else { h },
					if i & 4 == 0 { -h } else { h },
				)
			})
			.collect();
		let faces = vec![
			[0, 2, 1],
			[1, 2, 3],
			[4, 5, 6],
			[5, 7, 6],
			[0, 1, 4],
			[1, 5, 4],
			[2, 6, 3],
			[3, 6, 7],
			[0, 4, 2],
			[2, 4, 6],
			[1, 3, 5],
			[3, 7, 5],
		];
		Self { positions, faces }
	}

	pub fn with_offset(mut self, offset: V3) -> Self {
		for p in self.positions.iter_mut() {
			*p += offset;
		}
		self
	}

	pub fn build(self) -> Result<Mesh, MeshError> {
		Mesh::new(self.positions, self.faces)
	}
}
