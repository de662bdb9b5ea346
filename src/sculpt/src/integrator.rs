use crate::V3;

/// Damped explicit Euler step with a hard per-tick displacement clamp.
#[derive(Clone, Copy, Debug)]
pub struct VelocityIntegrator {
	pub damping: f32,
	pub timestep: f32,
	pub max_displacement: f32,
}

impl VelocityIntegrator {
	/// Update `velocities` in place and return the raw displacement of every
	/// vertex. Damping applies on every call, forces or not.
	pub fn integrate(&self, velocities: &mut [V3], forces: &[V3]) -> Vec<V3> {
		velocities
			.iter_mut()
			.zip(forces)
			.map(|(v, f)| {
				*v = (*v + f) * self.damping;
				self.clamp(*v * self.timestep)
			})
			.collect()
	}

	pub fn clamp(&self, dp: V3) -> V3 {
		let l = dp.magnitude();
		if l > self.max_displacement {
			dp * (self.max_displacement / l)
		} else {
			dp
		}
	}
}
