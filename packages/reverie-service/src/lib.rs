pub mod capture;
pub mod cell;
pub mod session;
pub mod timeline;

mod error;

pub use capture::{CaptureRequest, capture};
pub use cell::{CellState, CellView, DeleteOutcome, MemoryCell};
pub use error::{Error, Result, StoreError};
pub use session::{SessionHandle, TimelineEvent, TimelineSession, TimelineView};
pub use timeline::{Applied, Timeline};

use std::{fmt, future::Future, pin::Pin, sync::Arc};

use reverie_config::{Backend, Feed};
use reverie_domain::{MemoryId, MemoryRecord, NewMemory};
use reverie_providers::{feed, objects, rest};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Rows of memories owned by the backend.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Every visible record, ascending by date.
	fn bulk_read<'a>(&'a self) -> BoxFuture<'a, StoreResult<Vec<MemoryRecord>>>;

	fn delete<'a>(&'a self, id: MemoryId) -> BoxFuture<'a, StoreResult<()>>;

	fn insert<'a>(&'a self, memory: &'a NewMemory) -> BoxFuture<'a, StoreResult<MemoryRecord>>;

	/// Opens the insert push channel. Delivery is at-least-once and unordered relative to any
	/// concurrent bulk read.
	///
	/// Once the returned future resolves, every row inserted afterwards is delivered, including
	/// rows a following [`RecordStore::bulk_read`] also returns.
	fn subscribe_inserts<'a>(
		&'a self,
		sink: InsertSink,
	) -> BoxFuture<'a, StoreResult<SubscriptionHandle>>;
}

pub trait BlobStorage
where
	Self: Send + Sync,
{
	/// Stores `bytes` at `path` and returns the public URL.
	fn put<'a>(
		&'a self,
		path: &'a str,
		bytes: Vec<u8>,
		content_type: &'a str,
	) -> BoxFuture<'a, StoreResult<String>>;
}

/// Receiving end of a push channel as seen by the transport.
#[derive(Clone)]
pub struct InsertSink {
	deliver: Arc<dyn Fn(MemoryRecord) -> bool + Send + Sync>,
}
impl InsertSink {
	pub fn new(deliver: impl Fn(MemoryRecord) -> bool + Send + Sync + 'static) -> Self {
		Self { deliver: Arc::new(deliver) }
	}

	/// Returns `false` once the receiving side is gone; transports stop delivering then.
	pub fn deliver(&self, record: MemoryRecord) -> bool {
		(self.deliver)(record)
	}
}
impl fmt::Debug for InsertSink {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InsertSink").finish_non_exhaustive()
	}
}

/// Live push subscription. Released exactly once, either by [`SubscriptionHandle::unsubscribe`]
/// or, as a fallback, on drop.
pub struct SubscriptionHandle {
	release: Option<Box<dyn FnOnce() + Send>>,
}
impl SubscriptionHandle {
	pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
		Self { release: Some(Box::new(release)) }
	}

	pub fn unsubscribe(mut self) {
		if let Some(release) = self.release.take() {
			release();
		}
	}
}
impl Drop for SubscriptionHandle {
	fn drop(&mut self) {
		if let Some(release) = self.release.take() {
			tracing::warn!("Subscription handle dropped without unsubscribe; releasing it now.");

			release();
		}
	}
}
impl fmt::Debug for SubscriptionHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubscriptionHandle").field("live", &self.release.is_some()).finish()
	}
}

/// Record store and blob storage backed by the hosted backend's HTTP API.
#[derive(Clone, Debug)]
pub struct BackendStore {
	pub backend: Backend,
	pub feed: Feed,
}
impl BackendStore {
	pub fn new(backend: Backend, feed: Feed) -> Self {
		Self { backend, feed }
	}
}
impl RecordStore for BackendStore {
	fn bulk_read<'a>(&'a self) -> BoxFuture<'a, StoreResult<Vec<MemoryRecord>>> {
		Box::pin(async move { Ok(rest::select_ordered_by_date(&self.backend).await?) })
	}

	/// An empty delete representation is ambiguous: the row policy hid it, or it was already
	/// gone. A follow-up read tells the two apart, since every row stays readable to all callers.
	fn delete<'a>(&'a self, id: MemoryId) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(async move {
			let removed = rest::delete_by_id(&self.backend, id).await?;

			if removed > 0 {
				return Ok(());
			}

			let still_visible = rest::row_exists(&self.backend, id).await?;

			Err(empty_delete_error(id, still_visible))
		})
	}

	fn insert<'a>(&'a self, memory: &'a NewMemory) -> BoxFuture<'a, StoreResult<MemoryRecord>> {
		Box::pin(async move { Ok(rest::insert(&self.backend, memory).await?) })
	}

	fn subscribe_inserts<'a>(
		&'a self,
		sink: InsertSink,
	) -> BoxFuture<'a, StoreResult<SubscriptionHandle>> {
		Box::pin(async move {
			let start = feed::start_watermark(&self.backend).await?;
			let task = feed::spawn(self.backend.clone(), self.feed.clone(), start, move |record| {
				sink.deliver(record)
			});

			Ok(SubscriptionHandle::new(move || task.abort()))
		})
	}
}
impl BlobStorage for BackendStore {
	fn put<'a>(
		&'a self,
		path: &'a str,
		bytes: Vec<u8>,
		content_type: &'a str,
	) -> BoxFuture<'a, StoreResult<String>> {
		Box::pin(async move {
			objects::upload(&self.backend, path, bytes, content_type).await?;

			Ok(objects::public_url(&self.backend, path))
		})
	}
}

fn empty_delete_error(id: MemoryId, still_visible: bool) -> StoreError {
	if still_visible {
		StoreError::NotOwner { message: format!("Row {id} was not deleted by the row policy.") }
	} else {
		StoreError::NotFound { message: format!("Row {id} does not exist.") }
	}
}
