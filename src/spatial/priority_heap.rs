//! A fixed-capacity binary heap. Unlike [std::collections::BinaryHeap] the
//! ordering (min or max) is chosen at construction and the storage never
//! grows, running out of room is treated as a sizing error
//!

/// Which element a [PriorityHeap] yields first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapOrder {
	/// Smallest element first
	Min,
	/// Largest element first
	Max,
}

/// Array-backed binary heap holding at most `capacity` elements
#[derive(Clone, Debug)]
pub struct PriorityHeap<T: Ord> {
	/// Elements in heap order
	items: Vec<T>,
	/// Maximum number of elements
	capacity: usize,
	/// Whether the root is the smallest or largest element
	order: HeapOrder,
}

impl<T: Ord> PriorityHeap<T> {
	/// Create an empty heap with room for `capacity` elements
	pub fn new(capacity: usize, order: HeapOrder) -> Self {
		PriorityHeap {
			items: Vec::with_capacity(capacity),
			capacity,
			order,
		}
	}
	/// Maximum number of elements
	pub fn get_capacity(&self) -> usize {
		self.capacity
	}
	/// Whether the root is the smallest or largest element
	pub fn get_order(&self) -> HeapOrder {
		self.order
	}
	/// Number of elements
	pub fn len(&self) -> usize {
		self.items.len()
	}
	/// Whether the heap holds no elements
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
	/// Whether another push would exceed the capacity
	pub fn is_full(&self) -> bool {
		self.items.len() >= self.capacity
	}
	/// Remove every element, the capacity is kept
	pub fn clear(&mut self) {
		self.items.clear();
	}
	/// The element [PriorityHeap::pop] would return next
	pub fn peek(&self) -> Option<&T> {
		self.items.first()
	}
	/// Insert an element. Panics if the heap is already at capacity
	pub fn push(&mut self, item: T) {
		if self.is_full() {
			panic!(
				"PriorityHeap is full, cannot push more than {} elements",
				self.capacity
			);
		}
		self.items.push(item);
		self.sift_up(self.items.len() - 1);
	}
	/// Remove and return the root element
	pub fn pop(&mut self) -> Option<T> {
		if self.items.is_empty() {
			return None;
		}
		let root = self.items.swap_remove(0);
		if !self.items.is_empty() {
			self.sift_down(0);
		}
		Some(root)
	}
	/// Drain the heap into a [Vec] in pop order
	pub fn into_sorted_vec(mut self) -> Vec<T> {
		let mut sorted = Vec::with_capacity(self.items.len());
		while let Some(item) = self.pop() {
			sorted.push(item);
		}
		sorted
	}
	/// Whether `a` belongs closer to the root than `b`
	fn precedes(&self, a: &T, b: &T) -> bool {
		match self.order {
			HeapOrder::Min => a < b,
			HeapOrder::Max => a > b,
		}
	}
	/// Restore heap order after appending at `index`
	fn sift_up(&mut self, mut index: usize) {
		while index > 0 {
			let parent = (index - 1) / 2;
			if self.precedes(&self.items[index], &self.items[parent]) {
				self.items.swap(index, parent);
				index = parent;
			} else {
				break;
			}
		}
	}
	/// Restore heap order after replacing the element at `index`
	fn sift_down(&mut self, mut index: usize) {
		let len = self.items.len();
		loop {
			let left = 2 * index + 1;
			let right = left + 1;
			let mut best = index;
			if left < len && self.precedes(&self.items[left], &self.items[best]) {
				best = left;
			}
			if right < len && self.precedes(&self.items[right], &self.items[best]) {
				best = right;
			}
			if best == index {
				break;
			}
			self.items.swap(index, best);
			index = best;
		}
	}
}
