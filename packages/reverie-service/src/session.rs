//! Timeline state manager scoped to one mounted view.
//!
//! The session owns the collection and a single event queue. Push deliveries and cell deletion
//! completions only post [`TimelineEvent`]s; [`TimelineSession::apply`] is the one place the
//! collection changes.

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{Applied, Error, InsertSink, RecordStore, Result, SubscriptionHandle, Timeline};
use reverie_config::Layout;
use reverie_domain::{LayoutProjection, MemoryId, MemoryRecord, ScrollProgress, projection};

#[derive(Clone, Debug, PartialEq)]
pub enum TimelineEvent {
	Loaded(Vec<MemoryRecord>),
	Inserted(MemoryRecord),
	Removed(MemoryId),
}

/// Cloneable, non-owning access to a session's event queue.
#[derive(Clone, Debug)]
pub struct SessionHandle {
	events: UnboundedSender<TimelineEvent>,
	mounted: Arc<AtomicBool>,
}
impl SessionHandle {
	pub fn is_mounted(&self) -> bool {
		self.mounted.load(Ordering::Acquire)
	}

	/// Queues a local removal after a confirmed delete. Returns `false`, and posts nothing, once
	/// the session is unmounted.
	pub fn remove(&self, id: MemoryId) -> bool {
		self.post(TimelineEvent::Removed(id))
	}

	fn post(&self, event: TimelineEvent) -> bool {
		if !self.is_mounted() {
			tracing::debug!(?event, "Discarding event for an unmounted timeline.");

			return false;
		}

		self.events.send(event).is_ok()
	}
}

/// Records and layout projection taken from the same count.
#[derive(Debug)]
pub struct TimelineView<'a> {
	pub records: &'a [MemoryRecord],
	pub projection: LayoutProjection,
}

pub struct TimelineSession {
	store: Arc<dyn RecordStore>,
	layout: Layout,
	timeline: Timeline,
	events_tx: UnboundedSender<TimelineEvent>,
	events_rx: UnboundedReceiver<TimelineEvent>,
	mounted: Arc<AtomicBool>,
	subscription: Option<SubscriptionHandle>,
}
impl TimelineSession {
	/// Creates an empty, mounted session. Nothing touches the store until [`Self::load`] or
	/// [`Self::subscribe`].
	pub fn mount(store: Arc<dyn RecordStore>, layout: Layout) -> Self {
		let (events_tx, events_rx) = mpsc::unbounded_channel();

		tracing::info!("Timeline session mounted.");

		Self {
			store,
			layout,
			timeline: Timeline::new(),
			events_tx,
			events_rx,
			mounted: Arc::new(AtomicBool::new(true)),
			subscription: None,
		}
	}

	pub fn handle(&self) -> SessionHandle {
		SessionHandle { events: self.events_tx.clone(), mounted: self.mounted.clone() }
	}

	/// One bulk read. Success replaces the collection; failure keeps it as it was and is
	/// returned for display only.
	///
	/// Events queued while the read was in flight stay queued and apply on the next
	/// [`Self::pump`], after the replacement.
	pub async fn load(&mut self) -> Result<usize> {
		match self.store.bulk_read().await {
			Ok(records) => {
				self.apply(TimelineEvent::Loaded(records));

				let count = self.timeline.len();

				tracing::info!(count, "Timeline loaded.");

				Ok(count)
			},
			Err(err) => {
				tracing::warn!(error = %err, kept = self.timeline.len(), "Timeline load failed.");

				Err(Error::Load { message: err.to_string() })
			},
		}
	}

	/// Opens the insert push channel. A second call while subscribed does nothing.
	///
	/// Call it before [`Self::load`]: inserts landing between the two are then both delivered
	/// and read, and the duplicate is dropped.
	pub async fn subscribe(&mut self) -> Result<()> {
		if self.subscription.is_some() {
			return Ok(());
		}

		let handle = self.handle();
		let sink = InsertSink::new(move |record| handle.post(TimelineEvent::Inserted(record)));
		let subscription = self
			.store
			.subscribe_inserts(sink)
			.await
			.map_err(|err| Error::Subscription { message: err.to_string() })?;

		self.subscription = Some(subscription);

		tracing::info!("Timeline subscribed to inserts.");

		Ok(())
	}

	pub fn is_subscribed(&self) -> bool {
		self.subscription.is_some()
	}

	/// Applies every queued event in arrival order and returns how many were applied.
	pub fn pump(&mut self) -> usize {
		let mut applied = 0;

		while let Ok(event) = self.events_rx.try_recv() {
			self.apply(event);

			applied += 1;
		}

		applied
	}

	/// Waits for the next queued event and applies it.
	pub async fn next_event(&mut self) -> Option<Applied> {
		let event = self.events_rx.recv().await?;

		Some(self.apply(event))
	}

	/// Local removal after a confirmed delete. Unknown ids are a no-op.
	pub fn remove(&mut self, id: MemoryId) -> Applied {
		self.apply(TimelineEvent::Removed(id))
	}

	pub fn apply(&mut self, event: TimelineEvent) -> Applied {
		match event {
			TimelineEvent::Loaded(records) => self.timeline.replace(records),
			TimelineEvent::Inserted(record) => {
				let id = record.id;
				let applied = self.timeline.append(record);

				if applied != Applied::Appended {
					tracing::debug!(%id, ?applied, "Ignoring push insert.");
				}

				applied
			},
			TimelineEvent::Removed(id) => self.timeline.remove(id),
		}
	}

	pub fn records(&self) -> &[MemoryRecord] {
		self.timeline.records()
	}

	pub fn timeline(&self) -> &Timeline {
		&self.timeline
	}

	pub fn len(&self) -> usize {
		self.timeline.len()
	}

	pub fn is_empty(&self) -> bool {
		self.timeline.is_empty()
	}

	pub fn layout(&self) -> &Layout {
		&self.layout
	}

	pub fn project(&self, progress: ScrollProgress) -> LayoutProjection {
		projection::project(progress, self.timeline.len(), &self.layout)
	}

	pub fn view(&self, progress: ScrollProgress) -> TimelineView<'_> {
		let records = self.timeline.records();

		TimelineView {
			records,
			projection: projection::project(progress, records.len(), &self.layout),
		}
	}

	/// Unmounts the session and releases the push channel. Consuming `self` makes a second
	/// release impossible.
	pub fn teardown(mut self) {
		self.release();

		tracing::info!(count = self.timeline.len(), "Timeline session torn down.");
	}

	fn release(&mut self) {
		self.mounted.store(false, Ordering::Release);

		if let Some(subscription) = self.subscription.take() {
			subscription.unsubscribe();
		}
	}
}
impl Drop for TimelineSession {
	fn drop(&mut self) {
		if self.subscription.is_some() {
			tracing::warn!("Timeline session dropped without teardown; releasing subscription.");
		}

		self.release();
	}
}
