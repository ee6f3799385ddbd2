//! Insert feed: polls the table for rows above a watermark and hands each new row to a sink.
//!
//! Delivery is at-least-once. A failed poll keeps the watermark, so rows may be handed out again
//! after a partial failure; consumers dedup by id.
//!
//! The starting watermark is fixed by the caller, before any bulk read it pairs with, so a row
//! inserted between the two reads is still above it. The watermark assumes ids become visible in
//! id order: a row whose lower id commits after a higher id was already delivered is skipped
//! until the next bulk read.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

use crate::Result;
use reverie_config::{Backend, Feed};
use reverie_domain::{MemoryId, MemoryRecord};

enum PollOutcome {
	Delivered(usize),
	SinkClosed,
}

/// Highest id visible right now. Fetch it before the bulk read and pass it to [`spawn`].
pub async fn start_watermark(backend: &Backend) -> Result<Option<MemoryId>> {
	crate::rest::latest_id(backend).await
}

/// Starts the feed on the current runtime, delivering rows with ids above `start`. The sink
/// returns `false` once it no longer accepts rows, which stops the task; aborting the returned
/// handle stops it as well.
pub fn spawn<F>(backend: Backend, feed: Feed, start: Option<MemoryId>, sink: F) -> JoinHandle<()>
where
	F: Fn(MemoryRecord) -> bool + Send + Sync + 'static,
{
	tokio::spawn(async move {
		let backend = &backend;

		run(&feed, start, move |after| crate::rest::select_after(backend, after), sink).await;
	})
}

/// Poll loop over any row source returning rows with ids above the given watermark.
pub async fn run<S, Fut, F>(feed: &Feed, start: Option<MemoryId>, fetch: S, sink: F)
where
	S: Fn(Option<MemoryId>) -> Fut,
	Fut: Future<Output = Result<Vec<MemoryRecord>>>,
	F: Fn(MemoryRecord) -> bool,
{
	let mut watermark = start;
	let mut attempts: u32 = 0;

	loop {
		let delay = match poll_once(&mut watermark, &fetch, &sink).await {
			Ok(PollOutcome::Delivered(count)) => {
				if count > 0 {
					tracing::debug!(count, "Insert feed delivered rows.");
				}

				attempts = 0;

				Duration::from_millis(feed.poll_interval_ms)
			},
			Ok(PollOutcome::SinkClosed) => {
				tracing::debug!("Insert feed sink closed.");

				return;
			},
			Err(err) => {
				attempts = attempts.saturating_add(1);

				let backoff = backoff_for_attempt(feed, attempts);

				tracing::warn!(
					error = %err,
					attempts,
					backoff_ms = backoff.as_millis() as u64,
					"Insert feed poll failed."
				);

				backoff
			},
		};

		tokio::time::sleep(delay).await;
	}
}

async fn poll_once<S, Fut, F>(
	watermark: &mut Option<MemoryId>,
	fetch: &S,
	sink: &F,
) -> Result<PollOutcome>
where
	S: Fn(Option<MemoryId>) -> Fut,
	Fut: Future<Output = Result<Vec<MemoryRecord>>>,
	F: Fn(MemoryRecord) -> bool,
{
	let rows = fetch(*watermark).await?;
	let mut delivered = 0;

	for row in rows {
		let id = row.id;

		if !sink(row) {
			return Ok(PollOutcome::SinkClosed);
		}

		*watermark = Some(advance(*watermark, id));
		delivered += 1;
	}

	Ok(PollOutcome::Delivered(delivered))
}

fn advance(current: Option<MemoryId>, seen: MemoryId) -> MemoryId {
	match current {
		Some(current) if current > seen => current,
		_ => seen,
	}
}

pub fn backoff_for_attempt(feed: &Feed, attempt: u32) -> Duration {
	let exp = attempt.max(1).saturating_sub(1).min(16);
	let base = feed.base_backoff_ms.saturating_mul(1 << exp);

	Duration::from_millis(base.min(feed.max_backoff_ms))
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use super::*;

	fn row(id: i64) -> MemoryRecord {
		MemoryRecord {
			id: MemoryId(id),
			image_url: None,
			remark: format!("Row {id}"),
			date: reverie_domain::date_serde::parse("2024-01-01").expect("valid date"),
		}
	}

	fn table_fetch(
		table: Arc<Mutex<Vec<MemoryRecord>>>,
	) -> impl Fn(Option<MemoryId>) -> std::future::Ready<Result<Vec<MemoryRecord>>> {
		move |after| {
			let rows = table
				.lock()
				.expect("table lock")
				.iter()
				.filter(|row| after.is_none_or(|after| row.id > after))
				.cloned()
				.collect();

			std::future::ready(Ok(rows))
		}
	}

	#[test]
	fn backoff_doubles_until_capped() {
		let feed = Feed { poll_interval_ms: 1_000, base_backoff_ms: 500, max_backoff_ms: 4_000 };

		assert_eq!(backoff_for_attempt(&feed, 0), Duration::from_millis(500));
		assert_eq!(backoff_for_attempt(&feed, 1), Duration::from_millis(500));
		assert_eq!(backoff_for_attempt(&feed, 2), Duration::from_millis(1_000));
		assert_eq!(backoff_for_attempt(&feed, 4), Duration::from_millis(4_000));
		assert_eq!(backoff_for_attempt(&feed, 40), Duration::from_millis(4_000));
	}

	#[test]
	fn watermark_only_moves_forward() {
		assert_eq!(advance(None, MemoryId(3)), MemoryId(3));
		assert_eq!(advance(Some(MemoryId(9)), MemoryId(3)), MemoryId(9));
		assert_eq!(advance(Some(MemoryId(9)), MemoryId(12)), MemoryId(12));
	}

	#[tokio::test]
	async fn row_inserted_after_bulk_read_is_delivered() {
		let table = Arc::new(Mutex::new(vec![row(1), row(2), row(3)]));
		// Watermark first, then the bulk read, then a concurrent insert.
		let start = table.lock().expect("table lock").iter().map(|row| row.id).max();
		let bulk: Vec<MemoryId> =
			table.lock().expect("table lock").iter().map(|row| row.id).collect();

		table.lock().expect("table lock").push(row(4));

		let delivered = Arc::new(Mutex::new(Vec::new()));
		let sink_rows = delivered.clone();
		let feed = Feed::default();

		run(&feed, start, table_fetch(table), move |record| {
			sink_rows.lock().expect("sink lock").push(record.id);

			false
		})
		.await;

		assert_eq!(bulk, vec![MemoryId(1), MemoryId(2), MemoryId(3)]);
		assert_eq!(*delivered.lock().expect("sink lock"), vec![MemoryId(4)]);
	}

	#[tokio::test]
	async fn empty_table_start_delivers_first_row() {
		let table = Arc::new(Mutex::new(vec![row(1)]));
		let delivered = Arc::new(Mutex::new(Vec::new()));
		let sink_rows = delivered.clone();

		run(&Feed::default(), None, table_fetch(table), move |record| {
			sink_rows.lock().expect("sink lock").push(record.id);

			false
		})
		.await;

		assert_eq!(*delivered.lock().expect("sink lock"), vec![MemoryId(1)]);
	}

	#[tokio::test]
	async fn late_commit_below_watermark_is_skipped() {
		let table = Arc::new(Mutex::new(vec![row(3), row(6)]));
		let delivered = Arc::new(Mutex::new(Vec::new()));
		let sink_rows = delivered.clone();

		run(&Feed::default(), Some(MemoryId(5)), table_fetch(table), move |record| {
			sink_rows.lock().expect("sink lock").push(record.id);

			false
		})
		.await;

		assert_eq!(*delivered.lock().expect("sink lock"), vec![MemoryId(6)]);
	}
}
