use protocol::hand::{Hand, HandFrame, Landmark, FINGERTIPS};

use crate::command::{Command, Finger};
use crate::{V2, V3};

/// Validated fingertips of one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fingertips(pub [V3; FINGERTIPS]);

impl Fingertips {
	/// `None` for records with the wrong landmark count or non-finite
	/// coordinates.
	pub fn from_landmarks(landmarks: &[Landmark]) -> Option<Self> {
		if landmarks.len() != FINGERTIPS
			|| !landmarks.iter().all(Landmark::is_finite)
		{
			return None;
		}
		let mut tips = [V3::zeros(); FINGERTIPS];
		for (tip, l) in tips.iter_mut().zip(landmarks) {
			*tip = V3::new(l.x, l.y, l.z);
		}
		Some(Self(tips))
	}

	pub fn from_frame(frame: &HandFrame, hand: Hand) -> Option<Self> {
		let landmarks = frame.hand(hand)?;
		let result = Self::from_landmarks(landmarks);
		if result.is_none() {
			log::debug!("dropping malformed {:?} hand record", hand);
		}
		result
	}

	pub fn tip(&self, finger: Finger) -> V3 {
		self.0[finger.slot()]
	}

	pub fn pinch_distance(&self, finger: Finger) -> f32 {
		(self.tip(Finger::Thumb) - self.tip(finger)).magnitude()
	}

	/// Image-plane midpoint of two fingertips.
	pub fn anchor(&self, a: Finger, b: Finger) -> V2 {
		let mid = (self.tip(a) + self.tip(b)) * 0.5;
		V2::new(mid[0], mid[1])
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureEvent {
	pub command: Command,
	/// Hand that produced `command`.
	pub hand: Option<Hand>,
	pub left: Option<Fingertips>,
	pub right: Option<Fingertips>,
	/// Orbit-class anchor motion since the previous frame.
	pub delta: V2,
}

impl Default for GestureEvent {
	fn default() -> Self {
		Self {
			command: Command::None,
			hand: None,
			left: None,
			right: None,
			delta: V2::zeros(),
		}
	}
}

impl GestureEvent {
	pub fn none() -> Self {
		Self::default()
	}

	pub fn with_command(command: Command) -> Self {
		Self {
			command,
			..Self::default()
		}
	}

	pub fn tips(&self, hand: Hand) -> Option<&Fingertips> {
		match hand {
			Hand::Left => self.left.as_ref(),
			Hand::Right => self.right.as_ref(),
		}
	}
}
