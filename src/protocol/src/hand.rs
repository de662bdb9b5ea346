// hand: landmark samples as produced by the hand tracker

use serde::{Deserialize, Serialize};

/// Number of fingertip landmarks in one hand record: thumb, index, middle,
/// ring, pinky.
pub const FINGERTIPS: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

impl Landmark {
	pub fn new(x: f32, y: f32, z: f32) -> Self {
		Self { x, y, z }
	}

	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
	Left,
	Right,
}

impl Hand {
	/// Evaluation priority: Left always wins over Right.
	pub const ORDER: [Hand; 2] = [Hand::Left, Hand::Right];
}

/// One tracker sample. An absent hand is `None`, never a placeholder.
/// Landmark lists are kept as received so malformed records can be
/// detected downstream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
	pub timestamp: f64,
	pub left: Option<Vec<Landmark>>,
	pub right: Option<Vec<Landmark>>,
}

impl HandFrame {
	pub fn hand(&self, hand: Hand) -> Option<&[Landmark]> {
		match hand {
			Hand::Left => self.left.as_deref(),
			Hand::Right => self.right.as_deref(),
		}
	}
}
