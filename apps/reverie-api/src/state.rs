use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use reverie_config::{Config, Layout};
use reverie_domain::MemoryId;
use reverie_service::{
	BackendStore, BlobStorage, MemoryCell, RecordStore, SessionHandle, TimelineSession,
};

/// One mounted timeline shared by every request.
#[derive(Clone)]
pub struct AppState {
	/// `None` once torn down.
	pub session: Arc<Mutex<Option<TimelineSession>>>,
	pub handle: SessionHandle,
	pub cells: Arc<Mutex<HashMap<MemoryId, MemoryCell>>>,
	pub store: Arc<dyn RecordStore>,
	pub blobs: Arc<dyn BlobStorage>,
}
impl AppState {
	pub fn new(config: &Config) -> Self {
		let backend = Arc::new(BackendStore::new(config.backend.clone(), config.feed.clone()));

		Self::with_store(backend.clone(), backend, config.layout.clone())
	}

	pub fn with_store(
		store: Arc<dyn RecordStore>,
		blobs: Arc<dyn BlobStorage>,
		layout: Layout,
	) -> Self {
		let session = TimelineSession::mount(store.clone(), layout);
		let handle = session.handle();

		Self {
			session: Arc::new(Mutex::new(Some(session))),
			handle,
			cells: Arc::new(Mutex::new(HashMap::new())),
			store,
			blobs,
		}
	}

	/// Initial load and push subscription. Failures are logged; the view stays usable and empty.
	pub async fn start(&self) {
		let mut guard = self.session.lock().await;
		let Some(session) = guard.as_mut() else {
			return;
		};

		if let Err(err) = session.subscribe().await {
			tracing::warn!(error = %err, "Insert subscription unavailable.");
		}
		if let Err(err) = session.load().await {
			tracing::warn!(error = %err, "Initial timeline load failed.");
		}
	}

	pub async fn teardown(&self) {
		if let Some(session) = self.session.lock().await.take() {
			session.teardown();
		}

		self.cells.lock().await.clear();
	}
}
