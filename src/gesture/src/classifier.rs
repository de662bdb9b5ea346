use fnv::FnvHashSet;
use protocol::hand::{Hand, HandFrame};
use serde::{Deserialize, Serialize};

use crate::command::{Binding, Command, CommandKind, DEFAULT_BINDINGS};
use crate::event::{Fingertips, GestureEvent};
use crate::V2;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
	/// Thumb-finger distance below which the pair counts as touching,
	/// in normalized landmark units.
	pub touch_threshold: f32,
	/// Seconds a touch must be held before the command emits.
	pub hold_duration: f64,
	pub bindings: Vec<Binding>,
}

impl Default for GestureConfig {
	fn default() -> Self {
		Self {
			touch_threshold: 0.05,
			hold_duration: 0.1,
			bindings: DEFAULT_BINDINGS.to_vec(),
		}
	}
}

impl GestureConfig {
	pub fn with_touch_threshold(mut self, t: f32) -> Self {
		self.touch_threshold = t;
		self
	}

	pub fn with_hold_duration(mut self, t: f64) -> Self {
		self.hold_duration = t;
		self
	}

	pub fn with_bindings(mut self, bindings: Vec<Binding>) -> Self {
		self.bindings = bindings;
		self
	}
}

#[derive(Clone, Copy, Debug)]
struct Held {
	binding: Binding,
	since: f64,
}

pub struct GestureClassifier {
	config: GestureConfig,
	held: Option<Held>,
	// oneshots already emitted during the current hold
	fired: FnvHashSet<Command>,
	prev_anchor: Option<V2>,
}

impl GestureClassifier {
	pub fn new(config: GestureConfig) -> Self {
		Self {
			config,
			held: None,
			fired: FnvHashSet::default(),
			prev_anchor: None,
		}
	}

	pub fn config(&self) -> &GestureConfig {
		&self.config
	}

	pub fn held(&self) -> Command {
		self.held.map_or(Command::None, |h| h.binding.command)
	}

	pub fn reset(&mut self) {
		self.held = None;
		self.fired.clear();
		self.prev_anchor = None;
	}

	// Left before Right, then binding table order; first touch wins.
	fn touching(&self, left: Option<&Fingertips>, right: Option<&Fingertips>) -> Option<Binding> {
		for hand in Hand::ORDER {
			let tips = match hand {
				Hand::Left => left,
				Hand::Right => right,
			};
			let tips = match tips {
				None => continue,
				Some(t) => t,
			};
			for binding in self.config.bindings.iter().filter(|b| b.hand == hand) {
				if tips.pinch_distance(binding.finger) < self.config.touch_threshold {
					return Some(*binding);
				}
			}
		}
		None
	}

	pub fn classify(&mut self, frame: &HandFrame) -> GestureEvent {
		let left = Fingertips::from_frame(frame, Hand::Left);
		let right = Fingertips::from_frame(frame, Hand::Right);
		let mut event = GestureEvent {
			left,
			right,
			..GestureEvent::none()
		};

		let binding = match self.touching(left.as_ref(), right.as_ref()) {
			None => {
				self.reset();
				return event;
			}
			Some(b) => b,
		};
		let held = match self.held {
			Some(h) if h.binding.command == binding.command => h,
			_ => {
				let h = Held {
					binding,
					since: frame.timestamp,
				};
				self.held = Some(h);
				self.fired.clear();
				self.prev_anchor = None;
				h
			}
		};
		if frame.timestamp - held.since < self.config.hold_duration {
			return event;
		}

		let emit = match binding.kind {
			CommandKind::Continuous => true,
			CommandKind::Oneshot => self.fired.insert(binding.command),
		};
		if !emit {
			return event;
		}
		event.command = binding.command;
		event.hand = Some(binding.hand);
		let tips = event.tips(binding.hand).copied();
		if let (Some((a, b)), Some(tips)) = (binding.anchor, tips) {
			let anchor = tips.anchor(a, b);
			if let Some(prev) = self.prev_anchor {
				event.delta = anchor - prev;
			}
			self.prev_anchor = Some(anchor);
		}
		event
	}
}
