use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

/// Store-assigned row identifier. Stable for the lifetime of the row and never reused.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct MemoryId(pub i64);
impl fmt::Display for MemoryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
impl From<i64> for MemoryId {
	fn from(value: i64) -> Self {
		Self(value)
	}
}

/// One dated photo and caption entry, as stored by the backend.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemoryRecord {
	pub id: MemoryId,
	#[serde(default)]
	pub image_url: Option<String>,
	pub remark: String,
	#[serde(with = "crate::date_serde")]
	pub date: Date,
}
impl MemoryRecord {
	pub fn has_image(&self) -> bool {
		self.image_url.as_deref().map(|url| !url.trim().is_empty()).unwrap_or(false)
	}
}

/// Row payload for an insert; the backend assigns `id`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NewMemory {
	pub image_url: Option<String>,
	pub remark: String,
	#[serde(with = "crate::date_serde")]
	pub date: Date,
}
