//! Adds a new memory: upload the photo, then insert the row.
//!
//! The session never sees the new row from here; it arrives through the insert push channel.

use std::path::Path;

use time::Date;

use crate::{BlobStorage, Error, RecordStore, Result};
use reverie_domain::{MemoryRecord, NewMemory, caption};

const FALLBACK_EXTENSION: &str = "bin";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone, Debug)]
pub struct CaptureRequest {
	/// Name of the file as picked by the user; only its extension is kept.
	pub file_name: String,
	pub content_type: Option<String>,
	pub bytes: Vec<u8>,
	pub remark: String,
	pub date: Date,
}

pub async fn capture(
	store: &dyn RecordStore,
	blobs: &dyn BlobStorage,
	req: CaptureRequest,
) -> Result<MemoryRecord> {
	if req.bytes.is_empty() {
		return Err(Error::InvalidRequest { message: "Please select an image.".to_string() });
	}

	let Some(remark) = caption::normalize_remark(&req.remark) else {
		return Err(Error::InvalidRequest { message: "Please add a remark.".to_string() });
	};
	let remark = remark.to_string();
	let extension = extension_of(&req.file_name);
	let path = object_path(&extension);
	let content_type = req
		.content_type
		.filter(|value| !value.trim().is_empty())
		.unwrap_or_else(|| content_type_for(&extension).to_string());
	let size = req.bytes.len();
	let image_url = blobs.put(&path, req.bytes, &content_type).await?;

	tracing::debug!(%path, size, %content_type, "Uploaded memory image.");

	let memory = NewMemory { image_url: Some(image_url), remark, date: req.date };
	let record = store.insert(&memory).await?;

	tracing::info!(id = %record.id, "Memory captured.");

	Ok(record)
}

/// Random object name that keeps the original extension.
pub fn object_path(extension: &str) -> String {
	format!("{}.{extension}", uuid::Uuid::new_v4().simple())
}

/// Lowercased extension of `file_name`, or `bin` when it has none.
pub fn extension_of(file_name: &str) -> String {
	Path::new(file_name)
		.extension()
		.and_then(|ext| ext.to_str())
		.map(|ext| ext.trim().to_ascii_lowercase())
		.filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
		.unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

fn content_type_for(extension: &str) -> &'static str {
	match extension {
		"jpg" | "jpeg" => "image/jpeg",
		"png" => "image/png",
		"gif" => "image/gif",
		"webp" => "image/webp",
		"heic" => "image/heic",
		"avif" => "image/avif",
		_ => FALLBACK_CONTENT_TYPE,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_extension_or_falls_back() {
		assert_eq!(extension_of("beach.JPG"), "jpg");
		assert_eq!(extension_of("archive.tar.gz"), "gz");
		assert_eq!(extension_of("no_extension"), "bin");
		assert_eq!(extension_of("weird.??"), "bin");
	}

	#[test]
	fn object_path_is_random_with_extension() {
		let first = object_path("png");
		let second = object_path("png");

		assert!(first.ends_with(".png"));
		assert_eq!(first.len(), 32 + ".png".len());
		assert_ne!(first, second);
	}

	#[test]
	fn guesses_image_content_types() {
		assert_eq!(content_type_for("jpeg"), "image/jpeg");
		assert_eq!(content_type_for("bin"), FALLBACK_CONTENT_TYPE);
	}
}
