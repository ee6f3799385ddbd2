//! Presentation state for one memory card and its delete action.

use serde::Serialize;

use crate::{Error, RecordStore, Result, SessionHandle, StoreError, StoreResult};
use reverie_domain::{MemoryId, MemoryRecord, caption};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
	#[default]
	Collapsed,
	Expanded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
	/// The store confirmed the delete. `posted` is `false` when the session had already
	/// unmounted and the removal was discarded.
	Removed { posted: bool },
	/// This cell already reported its removal; nothing was sent to the store.
	AlreadyRemoved,
	/// A delete for this cell is still awaiting the store; nothing was sent.
	InProgress,
}

#[derive(Clone, Debug, Serialize)]
pub struct CellView {
	pub id: MemoryId,
	pub ordinal_label: String,
	pub remark: String,
	pub image_url: Option<String>,
	pub placeholder: bool,
	pub deleting: bool,
	pub date_short: String,
	pub date_long: String,
	pub state: CellState,
}

#[derive(Clone, Debug)]
pub struct MemoryCell {
	id: MemoryId,
	state: CellState,
	removed: bool,
	deleting: bool,
	notice: Option<String>,
}
impl MemoryCell {
	pub fn new(id: MemoryId) -> Self {
		Self { id, state: CellState::Collapsed, removed: false, deleting: false, notice: None }
	}

	pub fn id(&self) -> MemoryId {
		self.id
	}

	pub fn state(&self) -> CellState {
		self.state
	}

	pub fn is_removed(&self) -> bool {
		self.removed
	}

	pub fn is_deleting(&self) -> bool {
		self.deleting
	}

	pub fn activate(&mut self) {
		self.state = CellState::Expanded;
	}

	pub fn dismiss(&mut self) {
		self.state = CellState::Collapsed;
	}

	/// Last user-visible failure, if any.
	pub fn notice(&self) -> Option<&str> {
		self.notice.as_deref()
	}

	pub fn take_notice(&mut self) -> Option<String> {
		self.notice.take()
	}

	/// Issues the authoritative delete and, once confirmed, posts the local removal exactly once.
	///
	/// A `NotFound` answer means the row is already gone and counts as confirmed. On any other
	/// failure the cell keeps its state, records a notice and posts nothing.
	pub async fn delete(
		&mut self,
		store: &dyn RecordStore,
		session: &SessionHandle,
	) -> Result<DeleteOutcome> {
		if let Some(outcome) = self.begin_delete() {
			return Ok(outcome);
		}

		let result = store.delete(self.id).await;

		self.finish_delete(result, session)
	}

	/// Marks a delete as in flight. Returns the outcome to report instead when no store call
	/// should be made.
	///
	/// Callers that cannot hold the cell across the store round trip pair this with
	/// [`Self::finish_delete`].
	pub fn begin_delete(&mut self) -> Option<DeleteOutcome> {
		if self.removed {
			return Some(DeleteOutcome::AlreadyRemoved);
		}
		if self.deleting {
			return Some(DeleteOutcome::InProgress);
		}

		self.deleting = true;

		None
	}

	/// Applies the store's answer to a delete started with [`Self::begin_delete`].
	pub fn finish_delete(
		&mut self,
		result: StoreResult<()>,
		session: &SessionHandle,
	) -> Result<DeleteOutcome> {
		self.deleting = false;

		match result {
			Ok(()) | Err(StoreError::NotFound { .. }) => {
				self.state = CellState::Collapsed;
				self.removed = true;
				self.notice = None;

				let posted = session.remove(self.id);

				tracing::info!(id = %self.id, posted, "Memory deleted.");

				Ok(DeleteOutcome::Removed { posted })
			},
			Err(err) => {
				let err = Error::from(err);

				self.notice = Some(err.user_message());

				tracing::warn!(id = %self.id, error = %err, "Memory delete failed.");

				Err(err)
			},
		}
	}

	/// Display data for `record` shown at position `index` of the strip.
	pub fn view(&self, record: &MemoryRecord, index: usize) -> CellView {
		CellView {
			id: record.id,
			ordinal_label: caption::ordinal_label(index),
			remark: record.remark.clone(),
			image_url: record.image_url.clone().filter(|_| record.has_image()),
			placeholder: !record.has_image(),
			deleting: self.deleting,
			date_short: caption::short_date(record.date),
			date_long: caption::long_date(record.date),
			state: self.state,
		}
	}
}
