use gesture::{Command, GestureEvent};
use log::{debug, error, info, warn};
use protocol::pr_model::{EngineStatus, PrModel};
use thiserror::Error;

use crate::cohesion;
use crate::config::EngineConfig;
use crate::control::ControlMapper;
use crate::error::{ConfigError, TickError};
use crate::force;
use crate::history::HistoryBuffer;
use crate::influence::{AutoField, InfluenceField};
use crate::integrator::VelocityIntegrator;
use crate::mesh::{self, Mesh};
use crate::volume::{Correction, VolumeGuard};
use crate::V3;

/// User-visible conditions raised by a tick. None of them stop the loop.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Notice {
	#[error("nothing to rewind")]
	EmptyHistory,
	#[error("mesh encloses no volume, volume correction disabled")]
	VolumeGuardDisabled,
	#[error("mesh volume collapsed (volume ratio {0}), volume correction skipped")]
	VolumeUnrecoverable(f32),
	#[error("tick dropped: {0}")]
	TickFault(TickError),
}

/// Notices kept between drains; older ones are dropped first.
pub const MAX_NOTICES: usize = 64;

/// Owns the mesh and runs the fixed per-tick deformation pipeline.
///
/// Notices accumulate until [`DeformationEngine::take_notices`] drains them.
/// Only the newest [`MAX_NOTICES`] are kept.
pub struct DeformationEngine {
	config: EngineConfig,
	mesh: Mesh,
	rest: Vec<V3>,
	field: Box<dyn InfluenceField>,
	integrator: VelocityIntegrator,
	guard: VolumeGuard,
	history: HistoryBuffer,
	mapper: ControlMapper,
	status: EngineStatus,
	last_raw_peak: f32,
	collapsed: bool,
	notices: Vec<Notice>,
}

impl DeformationEngine {
	pub fn new(mesh: Mesh, config: EngineConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		let guard = VolumeGuard::new(mesh.positions(), mesh.faces(), config.volume_bounds);
		let mut engine = Self {
			rest: mesh.positions().to_vec(),
			field: Box::new(AutoField::new(config.spatial_index_crossover)),
			integrator: VelocityIntegrator {
				damping: config.damping,
				timestep: config.timestep,
				max_displacement: config.max_displacement,
			},
			guard,
			history: HistoryBuffer::new(config.history_depth),
			mapper: ControlMapper::new(config.workspace_center, config.workspace_scale),
			status: EngineStatus::Idle,
			last_raw_peak: 0.0,
			collapsed: false,
			notices: Vec::new(),
			mesh,
			config,
		};
		engine.check_guard();
		Ok(engine)
	}

	pub fn with_field(mut self, field: Box<dyn InfluenceField>) -> Self {
		self.field = field;
		self
	}

	fn check_guard(&mut self) {
		if self.guard.take_warning() {
			warn!("initial volume is zero, volume correction disabled for this mesh");
			self.notify(Notice::VolumeGuardDisabled);
		}
	}

	fn notify(&mut self, notice: Notice) {
		if self.notices.len() == MAX_NOTICES {
			self.notices.remove(0);
		}
		self.notices.push(notice);
	}

	/// Swap in a new mesh. Topology, rest shape, initial volume and history
	/// all start over.
	pub fn replace_mesh(&mut self, mesh: Mesh) {
		info!("replacing mesh: {} vertices, {} faces", mesh.len(), mesh.faces().len());
		self.guard = VolumeGuard::new(mesh.positions(), mesh.faces(), self.config.volume_bounds);
		self.rest = mesh.positions().to_vec();
		self.mesh = mesh;
		self.history.clear();
		self.status = EngineStatus::Idle;
		self.last_raw_peak = 0.0;
		self.collapsed = false;
		self.check_guard();
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn mesh(&self) -> &Mesh {
		&self.mesh
	}

	/// Direct mesh access for the embedding application. Structural damage
	/// done through it is repaired at the start of the next tick.
	pub fn mesh_mut(&mut self) -> &mut Mesh {
		&mut self.mesh
	}

	pub fn positions(&self) -> &[V3] {
		self.mesh.positions()
	}

	pub fn faces(&self) -> &[[usize; 3]] {
		self.mesh.faces()
	}

	pub fn status(&self) -> EngineStatus {
		self.status
	}

	pub fn history_len(&self) -> usize {
		self.history.len()
	}

	/// Largest raw, pre-smoothing displacement of the last tick.
	pub fn last_raw_peak(&self) -> f32 {
		self.last_raw_peak
	}

	pub fn volume_ratio(&self) -> Option<f32> {
		self.guard.ratio(self.mesh.positions(), self.mesh.faces())
	}

	pub fn take_notices(&mut self) -> Vec<Notice> {
		std::mem::take(&mut self.notices)
	}

	pub fn pr_model(&self) -> PrModel {
		PrModel {
			positions: self.mesh.positions().iter().map(|p| (*p).into()).collect(),
			faces: self.mesh.faces().to_vec(),
			status: self.status,
			notices: Vec::new(),
		}
	}

	/// Advance one frame. `dt <= 0` is a paused frame and changes nothing;
	/// integration always uses the configured timestep.
	pub fn tick(&mut self, dt: f32, event: &GestureEvent) -> EngineStatus {
		if dt <= 0.0 {
			return self.status;
		}
		if let Err(e) = self.mesh.check() {
			self.recover(e);
			return self.status;
		}
		self.status = match event.command {
			Command::Rewind => self.rewind(),
			Command::Reset => self.reset(),
			_ => {
				let control_points = self.mapper.control_points(event);
				self.step(&control_points)
			}
		};
		self.status
	}

	fn recover(&mut self, e: TickError) {
		error!("{}, resynchronizing", e);
		match e {
			TickError::LengthMismatch { .. } => self.mesh.resync(),
			TickError::NonFinite(_) => {
				let rest = &self.rest;
				let mut broken = Vec::new();
				for (id, p) in self.mesh.positions_mut().iter_mut().enumerate() {
					if !mesh::is_finite(p) {
						*p = rest[id];
						broken.push(id);
					}
				}
				let velocities = self.mesh.velocities_mut();
				for id in broken {
					velocities[id] = V3::zeros();
				}
			}
		}
		self.notify(Notice::TickFault(e));
	}

	fn settle_status(&self) -> EngineStatus {
		if self.mesh.max_speed() > self.config.rest_epsilon {
			EngineStatus::Settling
		} else {
			EngineStatus::Idle
		}
	}

	/// Run the deformation pipeline against explicit world-space control
	/// points.
	pub fn step(&mut self, control_points: &[V3]) -> EngineStatus {
		let idle = control_points.is_empty() && self.mesh.max_speed() < self.config.rest_epsilon;
		if !control_points.is_empty() {
			self.history.push(self.mesh.positions());
		}

		let radius = self.config.influence_radius;
		let neighborhoods = self.field.query(self.mesh.positions(), control_points, radius);
		let forces = force::accumulate(
			self.mesh.positions(),
			control_points,
			&neighborhoods,
			radius,
			self.config.force_strength,
		);
		let raw = self.integrator.integrate(self.mesh.velocities_mut(), &forces);
		self.last_raw_peak = raw.iter().map(|d| d.magnitude()).fold(0.0, f32::max);

		if !idle && self.last_raw_peak > 0.0 {
			let smoothed = cohesion::smooth(self.mesh.adjacency(), &raw, self.config.cohesion);
			for (p, d) in self.mesh.positions_mut().iter_mut().zip(smoothed) {
				*p += d;
			}
		}
		self.correct_volume();

		if control_points.is_empty() {
			self.settle_status()
		} else {
			EngineStatus::Deforming
		}
	}

	fn correct_volume(&mut self) {
		let (positions, faces) = self.mesh.geometry_mut();
		match self.guard.apply(positions, faces) {
			Correction::Scaled { ratio, scale } => {
				debug!("volume ratio {:.4} rescaled by {:.5}", ratio, scale);
				self.collapsed = false;
			}
			Correction::Unrecoverable { ratio } => {
				if !self.collapsed {
					warn!("volume ratio {} cannot be corrected by scaling", ratio);
					self.notify(Notice::VolumeUnrecoverable(ratio));
					self.collapsed = true;
				}
			}
			Correction::None => self.collapsed = false,
			Correction::Disabled => {}
		}
	}

	fn rewind(&mut self) -> EngineStatus {
		let snapshot = match self.history.pop() {
			Some(s) if s.len() == self.mesh.len() => s,
			_ => {
				info!("rewind ignored: history is empty");
				self.notify(Notice::EmptyHistory);
				return self.settle_status();
			}
		};
		self.mesh.set_positions(&snapshot);
		if self.config.zero_velocity_on_rewind {
			self.mesh.zero_velocities();
		}
		self.last_raw_peak = 0.0;
		debug!("rewound, {} snapshots left", self.history.len());
		EngineStatus::Rewinding
	}

	fn reset(&mut self) -> EngineStatus {
		self.mesh.set_positions(&self.rest);
		self.mesh.zero_velocities();
		self.last_raw_peak = 0.0;
		info!("mesh reset to rest shape");
		EngineStatus::Idle
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::mesh_model::MeshModel;
	use gesture::Fingertips;
	use pretty_assertions::assert_eq;

	fn sphere(config: EngineConfig) -> DeformationEngine {
		let mesh = MeshModel::new_icosphere(1, 1.0).build().unwrap();
		DeformationEngine::new(mesh, config).unwrap()
	}

	#[test]
	fn test_status_cycle() {
		let mut e = sphere(EngineConfig::default());
		let cp = [V3::new(1.2, 0.0, 0.0)];
		assert_eq!(e.step(&cp), EngineStatus::Deforming);
		assert_eq!(e.step(&[]), EngineStatus::Settling);
		let mut status = EngineStatus::Settling;
		for _ in 0..200 {
			status = e.step(&[]);
		}
		assert_eq!(status, EngineStatus::Idle);
	}

	#[test]
	fn test_snapshot_only_when_active() {
		let mut e = sphere(EngineConfig::default());
		e.step(&[]);
		assert_eq!(e.history_len(), 0);
		e.step(&[V3::new(1.2, 0.0, 0.0)]);
		assert_eq!(e.history_len(), 1);
		e.step(&[]);
		assert_eq!(e.history_len(), 1);
	}

	#[test]
	fn test_paused_frame() {
		let mut e = sphere(EngineConfig::default());
		let before = e.positions().to_vec();
		let mut event = GestureEvent::with_command(Command::Sculpt);
		event.right = Some(Fingertips([V3::new(0.5, 0.5, -0.3); 5]));
		e.tick(0.0, &event);
		assert_eq!(e.positions(), &before[..]);
		assert_eq!(e.history_len(), 0);
	}

	#[test]
	fn test_sculpt_event_deforms() {
		let mut e = sphere(EngineConfig::default().with_influence_radius(1.0).with_force_strength(1.0));
		let before = e.positions().to_vec();
		let mut event = GestureEvent::with_command(Command::Sculpt);
		// maps to world (0, 0, 1.2) with the default workspace
		event.right = Some(Fingertips([V3::new(0.5, 0.5, -0.3); 5]));
		assert_eq!(e.tick(1.0 / 30.0, &event), EngineStatus::Deforming);
		assert_ne!(e.positions(), &before[..]);
		// orbit drives no control points
		let mut e = sphere(EngineConfig::default());
		event.command = Command::Orbit;
		assert_eq!(e.tick(1.0 / 30.0, &event), EngineStatus::Idle);
		assert_eq!(e.positions(), &before[..]);
	}

	#[test]
	fn test_empty_rewind_notice() {
		let mut e = sphere(EngineConfig::default());
		let status = e.tick(0.03, &GestureEvent::with_command(Command::Rewind));
		assert_eq!(status, EngineStatus::Idle);
		assert_eq!(e.take_notices(), vec![Notice::EmptyHistory]);
		assert!(e.take_notices().is_empty());
	}

	#[test]
	fn test_rewind_keeps_velocity_when_asked() {
		let mut e = sphere(EngineConfig::default().with_zero_velocity_on_rewind(false));
		e.step(&[V3::new(1.2, 0.0, 0.0)]);
		e.tick(0.03, &GestureEvent::with_command(Command::Rewind));
		assert!(e.mesh().max_speed() > 0.0);
		assert_eq!(e.tick(0.03, &GestureEvent::none()), EngineStatus::Settling);
	}

	#[test]
	fn test_reset_restores_rest_shape() {
		let mut e = sphere(EngineConfig::default());
		let rest = e.positions().to_vec();
		for _ in 0..5 {
			e.step(&[V3::new(1.2, 0.0, 0.0)]);
		}
		assert_eq!(e.history_len(), 5);
		assert_eq!(e.tick(0.03, &GestureEvent::with_command(Command::Reset)), EngineStatus::Idle);
		assert_eq!(e.positions(), &rest[..]);
		assert_eq!(e.mesh().max_speed(), 0.0);
		// no control points on a reset tick, so no snapshot
		assert_eq!(e.history_len(), 5);
	}

	#[test]
	fn test_collapse_through_centroid_is_bounded() {
		let config = EngineConfig::default()
			.with_influence_radius(1.0)
			.with_force_strength(1e6)
			.with_cohesion(0.0);
		let mesh = MeshModel::new_cube(0.2).build().unwrap();
		let mut e = DeformationEngine::new(mesh, config).unwrap();
		for _ in 0..5 {
			e.step(&[V3::zeros()]);
			let ratio = e.volume_ratio().unwrap();
			assert!((0.8 - 1e-4..=1.2 + 1e-4).contains(&ratio), "{}", ratio);
		}
		assert!(e.take_notices().is_empty());
	}

	#[test]
	fn test_notices_are_capped() {
		let mut e = sphere(EngineConfig::default());
		for _ in 0..MAX_NOTICES + 10 {
			e.tick(0.03, &GestureEvent::with_command(Command::Rewind));
		}
		let notices = e.take_notices();
		assert_eq!(notices.len(), MAX_NOTICES);
		assert!(notices.iter().all(|n| *n == Notice::EmptyHistory));
	}

	#[test]
	fn test_length_mismatch_recovers() {
		let mut e = sphere(EngineConfig::default());
		e.mesh_mut().velocities_mut().truncate(10);
		let before = e.positions().to_vec();
		e.tick(0.03, &GestureEvent::none());
		assert_eq!(e.positions(), &before[..]);
		assert!(matches!(
			e.take_notices()[..],
			[Notice::TickFault(TickError::LengthMismatch { positions: 42, velocities: 10 })]
		));
		assert_eq!(e.mesh().velocities().len(), 42);
		// next tick runs normally
		assert_eq!(e.tick(0.03, &GestureEvent::none()), EngineStatus::Idle);
		assert!(e.take_notices().is_empty());
	}

	#[test]
	fn test_non_finite_position_recovers() {
		let mut e = sphere(EngineConfig::default());
		let rest = e.positions()[3];
		e.mesh_mut().positions_mut()[3] = V3::new(f32::NAN, 0.0, 0.0);
		e.tick(0.03, &GestureEvent::none());
		assert_eq!(e.positions()[3], rest);
		assert_eq!(e.take_notices(), vec![Notice::TickFault(TickError::NonFinite(3))]);
	}

	#[test]
	fn test_flat_mesh_warns_once() {
		let ps = vec![
			V3::new(0.0, 0.0, 0.0),
			V3::new(1.0, 0.0, 0.0),
			V3::new(1.0, 1.0, 0.0),
			V3::new(0.0, 1.0, 0.0),
		];
		let mesh = Mesh::new(ps, vec![[0, 1, 2], [0, 2, 3]]).unwrap();
		let mut e = DeformationEngine::new(mesh, EngineConfig::default()).unwrap();
		for _ in 0..3 {
			e.step(&[V3::new(0.5, 0.5, 0.2)]);
		}
		assert_eq!(e.take_notices(), vec![Notice::VolumeGuardDisabled]);
		assert!(e.volume_ratio().is_none());
	}

	#[test]
	fn test_invalid_config_rejected() {
		let mesh = MeshModel::new_cube(1.0).build().unwrap();
		assert!(DeformationEngine::new(mesh, EngineConfig::default().with_cohesion(2.0)).is_err());
	}
}
