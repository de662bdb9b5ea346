pub mod cohesion;
pub mod config;
pub mod control;
pub mod controller_message;
pub mod engine;
pub mod error;
pub mod force;
pub mod history;
pub mod influence;
pub mod integrator;
pub mod mesh;
pub mod mesh_model;
pub mod session;
pub mod time_manager;
pub mod volume;

pub use config::{EngineConfig, SessionConfig};
pub use engine::{DeformationEngine, Notice};
pub use mesh::Mesh;
pub use mesh_model::MeshModel;
pub use protocol::pr_model::EngineStatus;
pub use session::Session;

pub type V3 = nalgebra::Vector3<f32>;
pub type C3 = nalgebra::Vector3<i32>;
