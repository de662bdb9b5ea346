use crate::V3;

/// One neighbor-averaging pass over raw displacements.
///
/// Only vertices that moved this tick take part: a moving vertex is blended
/// toward the mean displacement of its moving neighbors, a still vertex stays
/// still. Must run after integration has finished for every vertex.
pub fn smooth(adjacency: &[Vec<usize>], raw: &[V3], factor: f32) -> Vec<V3> {
	let moved = |id: usize| raw[id] != V3::zeros();
	raw.iter()
		.enumerate()
		.map(|(id, dp)| {
			if !moved(id) {
				return *dp;
			}
			let mut sum = V3::zeros();
			let mut count = 0;
			for &n in adjacency[id].iter().filter(|&&n| moved(n)) {
				sum += raw[n];
				count += 1;
			}
			if count == 0 {
				return *dp;
			}
			dp.lerp(&(sum / count as f32), factor)
		})
		.collect()
}
