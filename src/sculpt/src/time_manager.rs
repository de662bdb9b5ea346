use std::time::{Duration, Instant};

pub enum TimeModel {
	/// Fixed frame time, never sleeps (offline runs, tests).
	VideoRender,
	/// Sleep out the remainder of each frame.
	RtFrameLock,
}

pub struct TimeManager {
	pft: f32,
	model: TimeModel,
	start_time: Instant,
}

impl TimeManager {
	pub fn new(tick_rate: f32, model: TimeModel) -> Self {
		Self {
			pft: 1.0 / tick_rate,
			model,
			start_time: Instant::now(),
		}
	}

	pub fn frame_time(&self) -> f32 {
		self.pft
	}

	/// Close the current frame and return its length in seconds.
	pub fn take_time(&mut self) -> f32 {
		let budget = Duration::from_secs_f32(self.pft);
		match self.model {
			TimeModel::VideoRender => {}
			TimeModel::RtFrameLock => {
				let passed = self.start_time.elapsed();
				if passed < budget {
					std::thread::sleep(budget - passed);
				}
			}
		}
		let now = Instant::now();
		let dt = match self.model {
			TimeModel::VideoRender => self.pft,
			TimeModel::RtFrameLock => {
				now.duration_since(self.start_time).as_secs_f32()
			}
		};
		self.start_time = now;
		dt
	}

	/// Load of the last frame relative to its budget, before sleeping.
	pub fn load(&self) -> f32 {
		self.start_time.elapsed().as_secs_f32() / self.pft
	}
}
