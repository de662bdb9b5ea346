use std::time::Instant;

use rand::Rng;
use sculpt::{DeformationEngine, EngineConfig, MeshModel, V3};

fn main() {
	let mut rng = rand::thread_rng();
	let mesh = MeshModel::new_icosphere(5, 1.0).build().expect("icosphere");
	let config = EngineConfig::default().with_influence_radius(0.4);
	let timestep = config.timestep;
	let mut engine = DeformationEngine::new(mesh, config).expect("default config");
	let rframes = 300;
	let start = Instant::now();
	for k in 0..rframes {
		let angle = k as f32 * 0.05;
		let jitter = V3::new(
			rng.gen_range(-0.01..0.01),
			rng.gen_range(-0.01..0.01),
			rng.gen_range(-0.01..0.01),
		);
		let cps = [
			V3::new(angle.cos(), angle.sin(), 0.0) * 1.1 + jitter,
			V3::new(0.0, angle.cos(), angle.sin()) * 1.1 - jitter,
		];
		engine.step(&cps);
	}
	let time = rframes as f32 * timestep;
	let duration = start.elapsed().as_secs_f32();
	eprintln!(
		"{} vertices: {:.3}% of real time",
		engine.mesh().len(),
		duration / time * 100.0
	);
}
