pub mod classifier;
pub mod command;
pub mod event;

pub use classifier::{GestureClassifier, GestureConfig};
pub use command::{Binding, Command, CommandKind, Finger, DEFAULT_BINDINGS};
pub use event::{Fingertips, GestureEvent};

pub type V2 = nalgebra::Vector2<f32>;
pub type V3 = nalgebra::Vector3<f32>;
