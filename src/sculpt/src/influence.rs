use fnv::FnvHashMap;

use crate::{C3, V3};

/// Radius query: for each control point, the ascending indices of vertices
/// strictly closer than `radius`.
pub trait InfluenceField: Send {
	fn query(
		&mut self,
		positions: &[V3],
		control_points: &[V3],
		radius: f32,
	) -> Vec<Vec<usize>>;
}

#[derive(Default)]
pub struct BruteForceField;

impl BruteForceField {
	#[cfg(not(debug_assertions))]
	fn scan(positions: &[V3], c: V3, radius: f32) -> Vec<usize> {
		use rayon::prelude::*;
		positions
			.par_iter()
			.enumerate()
			.filter(|(_, p)| (c - **p).magnitude() < radius)
			.map(|(id, _)| id)
			.collect()
	}

	#[cfg(debug_assertions)]
	fn scan(positions: &[V3], c: V3, radius: f32) -> Vec<usize> {
		positions
			.iter()
			.enumerate()
			.filter(|(_, p)| (c - **p).magnitude() < radius)
			.map(|(id, _)| id)
			.collect()
	}
}

impl InfluenceField for BruteForceField {
	fn query(
		&mut self,
		positions: &[V3],
		control_points: &[V3],
		radius: f32,
	) -> Vec<Vec<usize>> {
		control_points
			.iter()
			.map(|c| Self::scan(positions, *c, radius))
			.collect()
	}
}

/// Uniform hash grid with cell size equal to the query radius. Rebuilt on
/// every query since vertices move each tick.
#[derive(Default)]
pub struct GridField {
	csize: f32,
	data: FnvHashMap<C3, Vec<usize>>,
}

impl GridField {
	fn get_cpos(&self, p: V3) -> C3 {
		C3::new(
			(p[0] / self.csize).floor() as i32,
			(p[1] / self.csize).floor() as i32,
			(p[2] / self.csize).floor() as i32,
		)
	}

	fn rebuild(&mut self, positions: &[V3], radius: f32) {
		self.csize = radius;
		// keep bucket allocations between ticks
		for bucket in self.data.values_mut() {
			bucket.clear();
		}
		for (id, p) in positions.iter().enumerate() {
			let cpos = self.get_cpos(*p);
			self.data.entry(cpos).or_default().push(id);
		}
		// cells the mesh has left
		self.data.retain(|_, bucket| !bucket.is_empty());
	}
}

impl InfluenceField for GridField {
	fn query(
		&mut self,
		positions: &[V3],
		control_points: &[V3],
		radius: f32,
	) -> Vec<Vec<usize>> {
		if control_points.is_empty() {
			return Vec::new();
		}
		self.rebuild(positions, radius);
		let mut result = Vec::with_capacity(control_points.len());
		for c in control_points.iter() {
			let center = self.get_cpos(*c);
			let mut ids = Vec::new();
			for dx in -1..=1 {
				for dy in -1..=1 {
					for dz in -1..=1 {
						let cell = center + C3::new(dx, dy, dz);
						if let Some(bucket) = self.data.get(&cell) {
							ids.extend(bucket.iter().copied().filter(|&id| {
								(c - positions[id]).magnitude() < radius
							}));
						}
					}
				}
			}
			ids.sort_unstable();
			result.push(ids);
		}
		result
	}
}

/// Linear scan for small meshes, hash grid from `crossover` vertices up.
pub struct AutoField {
	crossover: usize,
	brute: BruteForceField,
	grid: GridField,
}

impl AutoField {
	pub fn new(crossover: usize) -> Self {
		Self {
			crossover,
			brute: BruteForceField,
			grid: GridField::default(),
		}
	}
}

impl InfluenceField for AutoField {
	fn query(
		&mut self,
		positions: &[V3],
		control_points: &[V3],
		radius: f32,
	) -> Vec<Vec<usize>> {
		if positions.len() >= self.crossover {
			self.grid.query(positions, control_points, radius)
		} else {
			self.brute.query(positions, control_points, radius)
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use rand::rngs::StdRng;
	use rand::{Rng, SeedableRng};

	fn cloud(n: usize) -> Vec<V3> {
		let mut rng = StdRng::seed_from_u64(7);
		(0..n)
			.map(|_| {
				V3::new(
					rng.gen_range(-2.0..2.0),
					rng.gen_range(-2.0..2.0),
					rng.gen_range(-2.0..2.0),
				)
			})
			.collect()
	}

	#[test]
	fn test_grid_matches_brute_force() {
		let ps = cloud(500);
		let cs = vec![V3::new(0.1, -0.3, 0.7), V3::new(-1.9, 1.2, 0.0)];
		for r in [0.2, 0.6, 1.5] {
			let a = BruteForceField.query(&ps, &cs, r);
			let b = GridField::default().query(&ps, &cs, r);
			assert_eq!(a, b);
		}
		assert!(!BruteForceField.query(&ps, &cs, 0.6)[0].is_empty());
	}

	#[test]
	fn test_empty_neighborhood() {
		let ps = cloud(50);
		let cs = vec![V3::new(100.0, 0.0, 0.0)];
		assert_eq!(BruteForceField.query(&ps, &cs, 0.5), vec![Vec::<usize>::new()]);
		assert_eq!(
			GridField::default().query(&ps, &cs, 0.5),
			vec![Vec::<usize>::new()]
		);
		assert!(AutoField::new(10).query(&ps, &[], 0.5).is_empty());
	}

	#[test]
	fn test_grid_drops_vacated_cells() {
		let mut ps = cloud(200);
		let cs = [V3::zeros()];
		let mut grid = GridField::default();
		for _ in 0..20 {
			grid.query(&ps, &cs, 0.5);
			assert!(grid.data.len() <= ps.len());
			for p in ps.iter_mut() {
				*p += V3::new(3.0, 0.0, 0.0);
			}
		}
		assert!(grid.data.values().all(|bucket| !bucket.is_empty()));
	}

	#[test]
	fn test_radius_is_exclusive() {
		let ps = vec![V3::zeros(), V3::new(1.0, 0.0, 0.0)];
		let hits = BruteForceField.query(&ps, &[V3::zeros()], 1.0);
		assert_eq!(hits, vec![vec![0usize]]);
	}
}
