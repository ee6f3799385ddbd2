use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	#[serde(default)]
	pub feed: Feed,
	#[serde(default)]
	pub layout: Layout,
	#[serde(default)]
	pub security: Security,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// Connection to the hosted backend that owns rows, objects and push delivery.
#[derive(Clone, Debug, Deserialize)]
pub struct Backend {
	/// Project base URL, e.g. "https://example.supabase.co". Trailing slashes are stripped.
	pub url: String,
	/// Public (anon) key sent as the `apikey` header.
	pub api_key: String,
	/// Optional user session token. Row-level policies are evaluated against it; the anon key is
	/// used when absent.
	pub access_token: Option<String>,
	#[serde(default = "default_table")]
	pub table: String,
	#[serde(default = "default_bucket")]
	pub bucket: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

/// Polling cadence of the insert feed.
#[derive(Clone, Debug, Deserialize)]
pub struct Feed {
	pub poll_interval_ms: u64,
	pub base_backoff_ms: u64,
	pub max_backoff_ms: u64,
}
impl Default for Feed {
	fn default() -> Self {
		Self { poll_interval_ms: 1_000, base_backoff_ms: 500, max_backoff_ms: 30_000 }
	}
}

/// Timeline strip geometry.
///
/// Widths are in CSS pixels, offsets in percent of the strip width, heights in viewport-height
/// units.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Layout {
	pub item_width_px: f64,
	pub gutter_px: f64,
	pub start_offset_pct: f64,
	pub end_offset_pct: f64,
	pub min_height_vh: f64,
	pub per_item_height_vh: f64,
	/// Item counts at or below this use `min_height_vh`.
	pub height_threshold: usize,
}
impl Default for Layout {
	fn default() -> Self {
		Self {
			item_width_px: 380.0,
			gutter_px: 16.0,
			start_offset_pct: 1.0,
			end_offset_pct: -90.0,
			min_height_vh: 300.0,
			per_item_height_vh: 50.0,
			height_threshold: 5,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_table() -> String {
	"memories".to_string()
}

fn default_bucket() -> String {
	"memories".to_string()
}

fn default_timeout_ms() -> u64 {
	10_000
}
