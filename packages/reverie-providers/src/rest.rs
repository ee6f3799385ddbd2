use reqwest::header::HeaderName;
use serde_json::Value;

use crate::{Error, Result};
use reverie_config::Backend;
use reverie_domain::{MemoryId, MemoryRecord, NewMemory};

const PREFER: HeaderName = HeaderName::from_static("prefer");
const RETURN_REPRESENTATION: &str = "return=representation";

pub fn table_url(cfg: &Backend) -> String {
	format!("{}/rest/v1/{}", cfg.url, cfg.table)
}

/// Every visible row, oldest date first.
pub async fn select_ordered_by_date(cfg: &Backend) -> Result<Vec<MemoryRecord>> {
	let res = crate::client(cfg)?
		.get(table_url(cfg))
		.headers(crate::auth_headers(cfg)?)
		.query(&[("select", "*"), ("order", "date.asc,id.asc")])
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	parse_rows(json)
}

/// Rows with an id above `after`, in id order. `None` returns every row.
pub async fn select_after(cfg: &Backend, after: Option<MemoryId>) -> Result<Vec<MemoryRecord>> {
	let mut query = vec![("select", "*".to_string()), ("order", "id.asc".to_string())];

	if let Some(after) = after {
		query.push(("id", format!("gt.{after}")));
	}

	let res = crate::client(cfg)?
		.get(table_url(cfg))
		.headers(crate::auth_headers(cfg)?)
		.query(&query)
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	parse_rows(json)
}

/// Highest visible id, or `None` for an empty table.
pub async fn latest_id(cfg: &Backend) -> Result<Option<MemoryId>> {
	let res = crate::client(cfg)?
		.get(table_url(cfg))
		.headers(crate::auth_headers(cfg)?)
		.query(&[("select", "id"), ("order", "id.desc"), ("limit", "1")])
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	parse_latest_id(&json)
}

/// Whether a row with `id` is currently visible to the caller.
pub async fn row_exists(cfg: &Backend, id: MemoryId) -> Result<bool> {
	let res = crate::client(cfg)?
		.get(table_url(cfg))
		.headers(crate::auth_headers(cfg)?)
		.query(&[
			("select", "id".to_string()),
			("id", format!("eq.{id}")),
			("limit", "1".to_string()),
		])
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	Ok(parse_latest_id(&json)?.is_some())
}

/// Deletes one row and returns how many rows the backend reports as removed.
///
/// Row-level policies hide rows the caller may not delete, so zero means "not permitted or
/// already gone" rather than an error.
pub async fn delete_by_id(cfg: &Backend, id: MemoryId) -> Result<usize> {
	let res = crate::client(cfg)?
		.delete(table_url(cfg))
		.headers(crate::auth_headers(cfg)?)
		.header(PREFER, RETURN_REPRESENTATION)
		.query(&[("id", format!("eq.{id}"))])
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	Ok(parse_rows(json)?.len())
}

pub async fn insert(cfg: &Backend, memory: &NewMemory) -> Result<MemoryRecord> {
	let res = crate::client(cfg)?
		.post(table_url(cfg))
		.headers(crate::auth_headers(cfg)?)
		.header(PREFER, RETURN_REPRESENTATION)
		.json(memory)
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	parse_rows(json)?.into_iter().next().ok_or_else(|| Error::InvalidResponse {
		message: "Insert response did not include the created row.".to_string(),
	})
}

fn parse_rows(json: Value) -> Result<Vec<MemoryRecord>> {
	if !json.is_array() {
		return Err(Error::InvalidResponse {
			message: "Expected a JSON array of rows.".to_string(),
		});
	}

	Ok(serde_json::from_value(json)?)
}

fn parse_latest_id(json: &Value) -> Result<Option<MemoryId>> {
	let rows = json.as_array().ok_or_else(|| Error::InvalidResponse {
		message: "Expected a JSON array of ids.".to_string(),
	})?;
	let Some(first) = rows.first() else {
		return Ok(None);
	};
	let id = first.get("id").and_then(Value::as_i64).ok_or_else(|| Error::InvalidResponse {
		message: "Row is missing a numeric id.".to_string(),
	})?;

	Ok(Some(MemoryId(id)))
}
