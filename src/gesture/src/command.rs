use protocol::hand::Hand;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Command {
	#[default]
	None,
	Sculpt,
	Orbit,
	Rewind,
	Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
	/// Emitted on every qualifying frame.
	Continuous,
	/// Emitted once per unbroken hold.
	Oneshot,
}

/// Fingertip slots, in landmark order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finger {
	Thumb = 0,
	Index = 1,
	Middle = 2,
	Ring = 3,
	Pinky = 4,
}

impl Finger {
	pub fn slot(self) -> usize {
		self as usize
	}
}

/// A command fires while `finger` touches the thumb of `hand`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Binding {
	pub command: Command,
	pub hand: Hand,
	pub finger: Finger,
	pub kind: CommandKind,
	/// Fingertip pair whose midpoint drives a 2D delta (orbit-class).
	#[serde(default)]
	pub anchor: Option<(Finger, Finger)>,
}

pub const DEFAULT_BINDINGS: &[Binding] = &[
	Binding {
		command: Command::Orbit,
		hand: Hand::Left,
		finger: Finger::Index,
		kind: CommandKind::Continuous,
		anchor: Some((Finger::Thumb, Finger::Index)),
	},
	Binding {
		command: Command::Rewind,
		hand: Hand::Left,
		finger: Finger::Middle,
		kind: CommandKind::Oneshot,
		anchor: None,
	},
	Binding {
		command: Command::Sculpt,
		hand: Hand::Right,
		finger: Finger::Index,
		kind: CommandKind::Continuous,
		anchor: None,
	},
	Binding {
		command: Command::Reset,
		hand: Hand::Right,
		finger: Finger::Pinky,
		kind: CommandKind::Oneshot,
		anchor: None,
	},
];
