use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const SHORT_DATE: &[BorrowedFormatItem<'static>] =
	format_description!("[month repr:long] [day padding:none], [year]");
const LONG_DATE: &[BorrowedFormatItem<'static>] =
	format_description!("[weekday repr:long], [month repr:long] [day padding:none], [year]");

pub const UNKNOWN_DATE: &str = "Unknown Date";

/// Returns the trimmed remark, or `None` when nothing but whitespace was given.
pub fn normalize_remark(raw: &str) -> Option<&str> {
	let trimmed = raw.trim();

	if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// "March 1, 2024".
pub fn short_date(date: Date) -> String {
	date.format(SHORT_DATE).unwrap_or_else(|_| UNKNOWN_DATE.to_string())
}

/// "Friday, March 1, 2024".
pub fn long_date(date: Date) -> String {
	date.format(LONG_DATE).unwrap_or_else(|_| UNKNOWN_DATE.to_string())
}

/// One-based label shown on each card, "Memory #3" for index 2.
pub fn ordinal_label(index: usize) -> String {
	format!("Memory #{}", index + 1)
}
