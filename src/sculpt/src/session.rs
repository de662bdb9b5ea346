use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use gesture::{Command, GestureClassifier, GestureEvent};
use log::{debug, error, info};
use protocol::hand::HandFrame;
use protocol::pr_model::{EngineStatus, PrModel};
use protocol::Message;

use crate::config::SessionConfig;
use crate::controller_message::ControllerMessage;
use crate::engine::DeformationEngine;
use crate::error::ConfigError;
use crate::mesh::Mesh;
use crate::time_manager::{TimeManager, TimeModel};

/// One interactive sculpting session: gesture classification feeding the
/// deformation engine, one sample per tick.
pub struct Session {
	pub tick_rate: f32,
	classifier: GestureClassifier,
	engine: DeformationEngine,
	last_event: GestureEvent,

	// -1: always play
	// 0: pause
	// n: play n frames
	forward_frames: i32,
}

impl Session {
	pub fn new(mesh: Mesh, config: SessionConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self {
			tick_rate: config.tick_rate,
			classifier: GestureClassifier::new(config.gesture),
			engine: DeformationEngine::new(mesh, config.engine)?,
			last_event: GestureEvent::none(),
			forward_frames: -1,
		})
	}

	pub fn with_paused(mut self) -> Self {
		self.forward_frames = 0;
		self
	}

	pub fn engine(&self) -> &DeformationEngine {
		&self.engine
	}

	pub fn engine_mut(&mut self) -> &mut DeformationEngine {
		&mut self.engine
	}

	/// Event resolved on the last tick, for scene consumers (orbit delta).
	pub fn last_event(&self) -> &GestureEvent {
		&self.last_event
	}

	/// Classify the newest sample, if any, and advance the engine. Without a
	/// new sample the command for this tick is `none`.
	pub fn tick(&mut self, dt: f32, frame: Option<&HandFrame>) -> EngineStatus {
		let event = match frame {
			Some(f) => self.classifier.classify(f),
			None => GestureEvent::none(),
		};
		if event.command != self.last_event.command {
			debug!("command {:?} -> {:?}", self.last_event.command, event.command);
		}
		let before = self.engine.status();
		let status = self.engine.tick(dt, &event);
		if status != before {
			info!("engine {:?} -> {:?}", before, status);
		}
		self.last_event = event;
		status
	}

	pub fn pr_model(&mut self) -> PrModel {
		let mut model = self.engine.pr_model();
		model.notices = self
			.engine
			.take_notices()
			.into_iter()
			.map(|n| {
				info!("{}", n);
				n.to_string()
			})
			.collect();
		model
	}

	fn handle(&mut self, msg: ControllerMessage, latest: &mut Option<HandFrame>) -> bool {
		match msg {
			ControllerMessage::Frame(frame) => *latest = Some(frame),
			ControllerMessage::TogglePause => {
				if self.forward_frames == 0 {
					self.forward_frames = -1;
				} else {
					self.forward_frames = 0;
				}
			}
			ControllerMessage::FrameForward => {
				if self.forward_frames == 0 {
					self.forward_frames += 1;
				}
			}
			ControllerMessage::Reset => {
				self.classifier.reset();
				let dt = 1.0 / self.tick_rate;
				self.engine.tick(dt, &GestureEvent::with_command(Command::Reset));
			}
			ControllerMessage::ReplaceMesh(model) => match model.build() {
				Ok(mesh) => {
					self.classifier.reset();
					self.engine.replace_mesh(mesh);
				}
				Err(e) => error!("mesh replacement rejected: {}", e),
			},
			ControllerMessage::Quit => return false,
		}
		true
	}

	/// Fixed-rate loop. Frames are latest-value: everything queued since the
	/// previous tick is drained and only the newest frame is used.
	pub fn run_thread(&mut self, tx: Sender<Message>, rx: Receiver<ControllerMessage>) {
		let mut tm = TimeManager::new(self.tick_rate, TimeModel::RtFrameLock);
		let mut dt = tm.frame_time();
		loop {
			let mut latest = None;
			loop {
				match rx.try_recv() {
					Ok(msg) => {
						if !self.handle(msg, &mut latest) {
							info!("session stopped");
							return;
						}
					}
					Err(TryRecvError::Empty) => break,
					Err(TryRecvError::Disconnected) => {
						info!("controller gone, session stopped");
						return;
					}
				}
			}

			if self.forward_frames != 0 {
				if self.forward_frames > 0 {
					self.forward_frames -= 1;
				}
				self.tick(dt, latest.as_ref());
				let model = self.pr_model();
				if tx.send(Message::WorldUpdate(model)).is_err() {
					info!("render side gone, session stopped");
					return;
				}
			}
			dt = tm.take_time();
		}
	}
}
