//! Ordered, id-unique collection of memory records for one mounted session.

use ahash::AHashSet;

use reverie_domain::{MemoryId, MemoryRecord};

/// What a single mutation did to the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
	Replaced { count: usize },
	Appended,
	Duplicate,
	/// Insert for an id this session already saw deleted.
	Tombstoned,
	Removed,
	Missing,
}

#[derive(Debug, Default)]
pub struct Timeline {
	records: Vec<MemoryRecord>,
	ids: AHashSet<MemoryId>,
	tombstones: AHashSet<MemoryId>,
}
impl Timeline {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the whole collection with a bulk read result, keeping its order.
	///
	/// Ids deleted earlier in this session stay out, and repeated ids keep their first
	/// occurrence.
	pub fn replace(&mut self, records: Vec<MemoryRecord>) -> Applied {
		self.records.clear();
		self.ids.clear();

		for record in records {
			if self.tombstones.contains(&record.id) || !self.ids.insert(record.id) {
				continue;
			}

			self.records.push(record);
		}

		Applied::Replaced { count: self.records.len() }
	}

	/// Appends at the end regardless of date.
	pub fn append(&mut self, record: MemoryRecord) -> Applied {
		if self.tombstones.contains(&record.id) {
			return Applied::Tombstoned;
		}
		if !self.ids.insert(record.id) {
			return Applied::Duplicate;
		}

		self.records.push(record);

		Applied::Appended
	}

	/// Removes a held record and remembers its id so redeliveries stay out. Unknown ids change
	/// nothing.
	pub fn remove(&mut self, id: MemoryId) -> Applied {
		if !self.ids.remove(&id) {
			return Applied::Missing;
		}

		self.tombstones.insert(id);
		self.records.retain(|record| record.id != id);

		Applied::Removed
	}

	pub fn records(&self) -> &[MemoryRecord] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn contains(&self, id: MemoryId) -> bool {
		self.ids.contains(&id)
	}

	pub fn position(&self, id: MemoryId) -> Option<usize> {
		if !self.contains(id) {
			return None;
		}

		self.records.iter().position(|record| record.id == id)
	}

	pub fn get(&self, id: MemoryId) -> Option<&MemoryRecord> {
		self.position(id).map(|index| &self.records[index])
	}
}
