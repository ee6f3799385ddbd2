use axum::{
	Json, Router,
	body::Bytes,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use reverie_domain::{LayoutProjection, MemoryId, MemoryRecord, ScrollProgress, date_serde};
use reverie_service::{CaptureRequest, CellState, CellView, DeleteOutcome, Error, MemoryCell};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/timeline", get(timeline))
		.route("/v1/timeline/reload", post(reload))
		.route("/v1/cells/{id}/expand", post(expand))
		.route("/v1/cells/{id}/collapse", post(collapse))
		.route("/v1/cells/{id}/delete", post(delete))
		.route("/v1/memories", post(create_memory))
		.with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
	#[serde(default)]
	pub progress: ScrollProgress,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
	pub items: Vec<CellView>,
	pub projection: LayoutProjection,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
	pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CellResponse {
	pub id: MemoryId,
	pub state: CellState,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
	pub id: MemoryId,
	pub removed: bool,
}

#[derive(Debug, Deserialize)]
pub struct CaptureQuery {
	pub remark: String,
	pub date: String,
	#[serde(default)]
	pub file_name: Option<String>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn timeline(
	State(state): State<AppState>,
	Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>, ApiError> {
	let mut guard = state.session.lock().await;
	let session = guard.as_mut().ok_or_else(unmounted)?;

	session.pump();

	let view = session.view(query.progress);
	let mut cells = state.cells.lock().await;

	cells.retain(|id, _| session.timeline().contains(*id));

	let items = view
		.records
		.iter()
		.enumerate()
		.map(|(index, record)| match cells.get(&record.id) {
			Some(cell) => cell.view(record, index),
			None => MemoryCell::new(record.id).view(record, index),
		})
		.collect();

	Ok(Json(TimelineResponse { items, projection: view.projection }))
}

async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
	let mut guard = state.session.lock().await;
	let session = guard.as_mut().ok_or_else(unmounted)?;
	let count = session.load().await?;

	Ok(Json(ReloadResponse { count }))
}

async fn expand(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<Json<CellResponse>, ApiError> {
	update_cell(&state, MemoryId(id), MemoryCell::activate).await
}

async fn collapse(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<Json<CellResponse>, ApiError> {
	update_cell(&state, MemoryId(id), MemoryCell::dismiss).await
}

async fn delete(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
	let id = MemoryId(id);

	ensure_known(&state, id).await?;

	// The cell stays in the map, marked in flight, while the store answers.
	let skipped =
		state.cells.lock().await.entry(id).or_insert_with(|| MemoryCell::new(id)).begin_delete();

	match skipped {
		Some(DeleteOutcome::InProgress) =>
			return Err(json_error(
				StatusCode::CONFLICT,
				"DELETE_IN_PROGRESS",
				"This memory is already being deleted.",
			)),
		Some(_) => return Ok(Json(DeleteResponse { id, removed: true })),
		None => {},
	}

	// A detached task finishes the delete even if the client goes away.
	let task = tokio::spawn(async move {
		let result = state.store.delete(id).await;
		let mut cells = state.cells.lock().await;
		let cell = cells.entry(id).or_insert_with(|| MemoryCell::new(id));

		cell.finish_delete(result, &state.handle)
	});
	let outcome = task.await.map_err(|err| {
		json_error(
			StatusCode::INTERNAL_SERVER_ERROR,
			"INTERNAL",
			format!("Delete task failed: {err}."),
		)
	})??;

	Ok(Json(DeleteResponse { id, removed: matches!(outcome, DeleteOutcome::Removed { .. }) }))
}

async fn create_memory(
	State(state): State<AppState>,
	Query(query): Query<CaptureQuery>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<(StatusCode, Json<MemoryRecord>), ApiError> {
	let date = date_serde::parse(&query.date).map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", format!("Invalid date: {err}."))
	})?;
	let content_type = headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.map(str::to_string);
	let req = CaptureRequest {
		file_name: query.file_name.unwrap_or_default(),
		content_type,
		bytes: body.to_vec(),
		remark: query.remark,
		date,
	};
	let record = reverie_service::capture(state.store.as_ref(), state.blobs.as_ref(), req).await?;

	Ok((StatusCode::CREATED, Json(record)))
}

async fn update_cell(
	state: &AppState,
	id: MemoryId,
	update: fn(&mut MemoryCell),
) -> Result<Json<CellResponse>, ApiError> {
	ensure_known(state, id).await?;

	let mut cells = state.cells.lock().await;
	let cell = cells.entry(id).or_insert_with(|| MemoryCell::new(id));

	update(cell);

	Ok(Json(CellResponse { id, state: cell.state() }))
}

async fn ensure_known(state: &AppState, id: MemoryId) -> Result<(), ApiError> {
	let mut guard = state.session.lock().await;
	let session = guard.as_mut().ok_or_else(unmounted)?;

	session.pump();

	if !session.timeline().contains(id) {
		return Err(json_error(
			StatusCode::NOT_FOUND,
			"NOT_FOUND",
			format!("Memory {id} is not on the timeline."),
		));
	}

	Ok(())
}

fn unmounted() -> ApiError {
	json_error(StatusCode::SERVICE_UNAVAILABLE, "UNMOUNTED", "The timeline is shutting down.")
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let (status, code) = match &err {
			Error::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
			Error::Load { .. } => (StatusCode::SERVICE_UNAVAILABLE, "LOAD_FAILED"),
			Error::NotOwner { .. } => (StatusCode::FORBIDDEN, "NOT_OWNER"),
			Error::Transient { .. } => (StatusCode::SERVICE_UNAVAILABLE, "TRANSIENT"),
			Error::Subscription { .. } => (StatusCode::SERVICE_UNAVAILABLE, "SUBSCRIPTION_FAILED"),
		};

		if status.is_server_error() {
			tracing::warn!(error = %err, "Request failed.");
		}

		json_error(status, code, err.user_message())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
