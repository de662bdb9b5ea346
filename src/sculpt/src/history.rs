use std::collections::VecDeque;

use crate::V3;

/// Bounded ring of full position snapshots, newest at the back.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
	capacity: usize,
	snapshots: VecDeque<Vec<V3>>,
}

impl HistoryBuffer {
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity,
			snapshots: VecDeque::with_capacity(capacity),
		}
	}

	pub fn len(&self) -> usize {
		self.snapshots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.snapshots.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn push(&mut self, positions: &[V3]) {
		if self.capacity == 0 {
			return;
		}
		let slot = if self.snapshots.len() == self.capacity {
			// reuse the evicted buffer
			let mut oldest = self.snapshots.pop_front().unwrap_or_default();
			oldest.clear();
			oldest.extend_from_slice(positions);
			oldest
		} else {
			positions.to_vec()
		};
		self.snapshots.push_back(slot);
	}

	pub fn pop(&mut self) -> Option<Vec<V3>> {
		self.snapshots.pop_back()
	}

	pub fn clear(&mut self) {
		self.snapshots.clear();
	}
}
