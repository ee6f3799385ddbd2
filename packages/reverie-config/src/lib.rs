mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, Feed, Layout, Security, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	let url = cfg.backend.url.trim();

	if !(url.starts_with("http://") || url.starts_with("https://")) {
		return Err(Error::Validation {
			message: "backend.url must start with http:// or https://.".to_string(),
		});
	}

	for (label, value) in [
		("backend.api_key", &cfg.backend.api_key),
		("backend.table", &cfg.backend.table),
		("backend.bucket", &cfg.backend.bucket),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_feed(cfg)?;
	validate_layout(cfg)?;

	Ok(())
}

fn validate_feed(cfg: &Config) -> Result<()> {
	let feed = &cfg.feed;

	if feed.poll_interval_ms == 0 {
		return Err(Error::Validation {
			message: "feed.poll_interval_ms must be greater than zero.".to_string(),
		});
	}
	if feed.base_backoff_ms == 0 {
		return Err(Error::Validation {
			message: "feed.base_backoff_ms must be greater than zero.".to_string(),
		});
	}
	if feed.max_backoff_ms < feed.base_backoff_ms {
		return Err(Error::Validation {
			message: "feed.max_backoff_ms must be at least feed.base_backoff_ms.".to_string(),
		});
	}

	Ok(())
}

fn validate_layout(cfg: &Config) -> Result<()> {
	let layout = &cfg.layout;

	for (label, value) in [
		("layout.item_width_px", layout.item_width_px),
		("layout.gutter_px", layout.gutter_px),
		("layout.start_offset_pct", layout.start_offset_pct),
		("layout.end_offset_pct", layout.end_offset_pct),
		("layout.min_height_vh", layout.min_height_vh),
		("layout.per_item_height_vh", layout.per_item_height_vh),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
	}

	if layout.item_width_px <= 0.0 {
		return Err(Error::Validation {
			message: "layout.item_width_px must be greater than zero.".to_string(),
		});
	}
	if layout.gutter_px < 0.0 {
		return Err(Error::Validation {
			message: "layout.gutter_px must be zero or greater.".to_string(),
		});
	}
	if layout.end_offset_pct > layout.start_offset_pct {
		return Err(Error::Validation {
			message: "layout.end_offset_pct must not exceed layout.start_offset_pct.".to_string(),
		});
	}
	if layout.min_height_vh <= 0.0 {
		return Err(Error::Validation {
			message: "layout.min_height_vh must be greater than zero.".to_string(),
		});
	}
	if layout.per_item_height_vh <= 0.0 {
		return Err(Error::Validation {
			message: "layout.per_item_height_vh must be greater than zero.".to_string(),
		});
	}

	// The first count above the threshold must not shrink the region below the minimum.
	let first_linear = (layout.height_threshold as f64 + 1.0) * layout.per_item_height_vh;

	if first_linear < layout.min_height_vh {
		return Err(Error::Validation {
			message: "layout.per_item_height_vh times (layout.height_threshold + 1) must be at least layout.min_height_vh."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.backend.access_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false) {
		cfg.backend.access_token = None;
	}

	let trimmed = cfg.backend.url.trim().trim_end_matches('/').to_string();

	cfg.backend.url = trimmed;
}
