use crate::V3;

/// Quadratic falloff: 1 at the control point, 0 at the radius, no crease at
/// the boundary.
pub fn falloff(dist: f32, radius: f32) -> f32 {
	let k = (1.0 - dist / radius).max(0.0);
	k * k
}

/// Net pull of every control point on every vertex. `neighborhoods[k]` holds
/// the vertices within reach of `control_points[k]`; forces from several
/// control points add up.
pub fn accumulate(
	positions: &[V3],
	control_points: &[V3],
	neighborhoods: &[Vec<usize>],
	radius: f32,
	strength: f32,
) -> Vec<V3> {
	let mut forces = vec![V3::zeros(); positions.len()];
	for (c, ids) in control_points.iter().zip(neighborhoods) {
		for &id in ids {
			let d = c - positions[id];
			let dist = d.magnitude();
			if dist == 0.0 || dist >= radius {
				continue;
			}
			forces[id] += d / dist * strength * falloff(dist, radius);
		}
	}
	forces
}
