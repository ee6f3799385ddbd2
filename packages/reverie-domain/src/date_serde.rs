//! Serde adapter for calendar dates in `YYYY-MM-DD` form.

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	parse(&raw).map_err(serde::de::Error::custom)
}

/// Parses `YYYY-MM-DD`, tolerating a trailing time component such as `2024-03-01T00:00:00`.
pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
	let trimmed = raw.trim();
	let day = trimmed.split_once('T').map(|(day, _)| day).unwrap_or(trimmed);

	Date::parse(day, DATE_FORMAT)
}
