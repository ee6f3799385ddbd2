//! In-memory record store and blob storage for tests.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard},
};

use time::Date;
use tokio::sync::Notify;

use reverie_domain::{MemoryId, MemoryRecord, NewMemory};
use reverie_service::{
	BlobStorage, BoxFuture, InsertSink, RecordStore, StoreError, StoreResult, SubscriptionHandle,
};

pub const BLOB_BASE_URL: &str = "https://blobs.test/public";

/// Fixture row with an image URL derived from its id.
pub fn record(id: i64, date: Date, remark: &str) -> MemoryRecord {
	MemoryRecord {
		id: MemoryId(id),
		image_url: Some(format!("{BLOB_BASE_URL}/{id}.jpg")),
		remark: remark.to_string(),
		date,
	}
}

#[derive(Default)]
struct Inner {
	rows: Vec<MemoryRecord>,
	next_id: i64,
	blobs: HashMap<String, Vec<u8>>,
	subscribers: HashMap<u64, InsertSink>,
	next_subscriber: u64,
	releases: usize,
	bulk_reads: usize,
	delete_calls: usize,
	fail_bulk_read: Option<StoreError>,
	fail_subscribe: Option<StoreError>,
	delete_faults: HashMap<MemoryId, StoreError>,
	delete_gate: Option<Arc<Notify>>,
}

/// Shared, cloneable fake of the hosted backend. Every clone sees the same rows.
#[derive(Clone, Default)]
pub struct InMemoryStore {
	inner: Arc<Mutex<Inner>>,
}
impl InMemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_rows(rows: Vec<MemoryRecord>) -> Self {
		let store = Self::new();

		{
			let mut inner = store.lock();

			inner.next_id = rows.iter().map(|row| row.id.0).max().unwrap_or(0);
			inner.rows = rows;
		}

		store
	}

	/// Simulates an insert made elsewhere: stores the row and delivers it to live subscribers.
	pub fn push(&self, record: MemoryRecord) {
		{
			let mut inner = self.lock();

			inner.next_id = inner.next_id.max(record.id.0);
			inner.rows.push(record.clone());
		}

		self.deliver(record);
	}

	/// Delivers `record` to live subscribers without touching the rows, as a redelivery would.
	pub fn deliver(&self, record: MemoryRecord) {
		let sinks: Vec<(u64, InsertSink)> =
			self.lock().subscribers.iter().map(|(key, sink)| (*key, sink.clone())).collect();

		for (key, sink) in sinks {
			if !sink.deliver(record.clone()) {
				self.lock().subscribers.remove(&key);
			}
		}
	}

	/// Removes a row as another client would, without notifying anyone.
	pub fn remove_row(&self, id: MemoryId) {
		self.lock().rows.retain(|row| row.id != id);
	}

	pub fn fail_next_bulk_read(&self, err: StoreError) {
		self.lock().fail_bulk_read = Some(err);
	}

	pub fn fail_next_subscribe(&self, err: StoreError) {
		self.lock().fail_subscribe = Some(err);
	}

	/// The next delete of `id` is refused by the row policy.
	pub fn deny_delete(&self, id: MemoryId) {
		self.fail_delete(id, StoreError::NotOwner { message: format!("Row {id} is not yours.") });
	}

	pub fn fail_delete(&self, id: MemoryId, err: StoreError) {
		self.lock().delete_faults.insert(id, err);
	}

	/// Holds every following delete until the returned gate is notified once per delete.
	pub fn gate_deletes(&self) -> Arc<Notify> {
		let gate = Arc::new(Notify::new());

		self.lock().delete_gate = Some(gate.clone());

		gate
	}

	pub fn rows(&self) -> Vec<MemoryRecord> {
		self.lock().rows.clone()
	}

	pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
		self.lock().blobs.get(path).cloned()
	}

	pub fn blob_paths(&self) -> Vec<String> {
		self.lock().blobs.keys().cloned().collect()
	}

	pub fn subscriber_count(&self) -> usize {
		self.lock().subscribers.len()
	}

	/// How many subscriptions were released through their handle.
	pub fn release_count(&self) -> usize {
		self.lock().releases
	}

	pub fn bulk_read_count(&self) -> usize {
		self.lock().bulk_reads
	}

	pub fn delete_call_count(&self) -> usize {
		self.lock().delete_calls
	}

	fn lock(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl RecordStore for InMemoryStore {
	fn bulk_read<'a>(&'a self) -> BoxFuture<'a, StoreResult<Vec<MemoryRecord>>> {
		Box::pin(async move {
			let mut inner = self.lock();

			inner.bulk_reads += 1;

			if let Some(err) = inner.fail_bulk_read.take() {
				return Err(err);
			}

			let mut rows = inner.rows.clone();

			rows.sort_by_key(|row| (row.date, row.id));

			Ok(rows)
		})
	}

	fn delete<'a>(&'a self, id: MemoryId) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(async move {
			let gate = {
				let mut inner = self.lock();

				inner.delete_calls += 1;
				inner.delete_gate.clone()
			};

			if let Some(gate) = gate {
				gate.notified().await;
			}

			let mut inner = self.lock();

			if let Some(err) = inner.delete_faults.remove(&id) {
				return Err(err);
			}

			let before = inner.rows.len();

			inner.rows.retain(|row| row.id != id);

			if inner.rows.len() == before {
				return Err(StoreError::NotFound { message: format!("Row {id} does not exist.") });
			}

			Ok(())
		})
	}

	fn insert<'a>(&'a self, memory: &'a NewMemory) -> BoxFuture<'a, StoreResult<MemoryRecord>> {
		Box::pin(async move {
			let record = {
				let mut inner = self.lock();

				inner.next_id += 1;

				let record = MemoryRecord {
					id: MemoryId(inner.next_id),
					image_url: memory.image_url.clone(),
					remark: memory.remark.clone(),
					date: memory.date,
				};

				inner.rows.push(record.clone());

				record
			};

			self.deliver(record.clone());

			Ok(record)
		})
	}

	fn subscribe_inserts<'a>(
		&'a self,
		sink: InsertSink,
	) -> BoxFuture<'a, StoreResult<SubscriptionHandle>> {
		Box::pin(async move {
			let key = {
				let mut inner = self.lock();

				if let Some(err) = inner.fail_subscribe.take() {
					return Err(err);
				}

				let key = inner.next_subscriber;

				inner.next_subscriber += 1;
				inner.subscribers.insert(key, sink);

				key
			};
			let store = self.clone();

			Ok(SubscriptionHandle::new(move || {
				let mut inner = store.lock();

				inner.subscribers.remove(&key);
				inner.releases += 1;
			}))
		})
	}
}
impl BlobStorage for InMemoryStore {
	fn put<'a>(
		&'a self,
		path: &'a str,
		bytes: Vec<u8>,
		_content_type: &'a str,
	) -> BoxFuture<'a, StoreResult<String>> {
		Box::pin(async move {
			self.lock().blobs.insert(path.to_string(), bytes);

			Ok(format!("{BLOB_BASE_URL}/{path}"))
		})
	}
}
