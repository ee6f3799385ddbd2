use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use reverie_config::{Config, Layout};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let table = root
		.as_table_mut()
		.expect("Sample config must be a table.")
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Sample config must include [{section}]."));

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn sample_toml_without(section: &str) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");

	root.as_table_mut().expect("Sample config must be a table.").remove(section);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("reverie_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> reverie_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = reverie_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = load_payload(SAMPLE_CONFIG_TOML.to_string()).expect("Sample config must load.");

	assert_eq!(cfg.backend.url, "https://example.supabase.co");
	assert_eq!(cfg.backend.access_token, None);
	assert_eq!(cfg.layout, Layout::default());
}

#[test]
fn missing_layout_and_feed_fall_back_to_defaults() {
	let payload = sample_toml_without("layout");
	let cfg = load_payload(payload).expect("Config without [layout] must load.");

	assert_eq!(cfg.layout, Layout::default());

	let payload = sample_toml_without("feed");
	let cfg = load_payload(payload).expect("Config without [feed] must load.");

	assert_eq!(cfg.feed.poll_interval_ms, 1_000);
	assert_eq!(cfg.feed.max_backoff_ms, 30_000);
}

#[test]
fn backend_url_requires_http_scheme() {
	let payload = sample_toml_with("backend", "url", Value::String("example.supabase.co".into()));
	let err = load_payload(payload).expect_err("Expected backend.url validation error.");

	assert!(
		err.to_string().contains("backend.url must start with http:// or https://."),
		"Unexpected error: {err}"
	);
}

#[test]
fn api_key_must_be_non_empty() {
	let payload = sample_toml_with("backend", "api_key", Value::String("   ".into()));
	let err = load_payload(payload).expect_err("Expected api_key validation error.");

	assert!(err.to_string().contains("backend.api_key must be non-empty."), "Unexpected error: {err}");
}

#[test]
fn unreadable_path_reports_read_error() {
	let path = env::temp_dir().join("reverie_config_test_missing_file.toml");
	let err = reverie_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, reverie_config::Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn feed_backoff_bounds_are_ordered() {
	let mut cfg = base_config();

	cfg.feed.max_backoff_ms = 100;

	let err = reverie_config::validate(&cfg).expect_err("Expected backoff bounds error.");

	assert!(
		err.to_string().contains("feed.max_backoff_ms must be at least feed.base_backoff_ms."),
		"Unexpected error: {err}"
	);
}

#[test]
fn layout_rejects_non_finite_values() {
	let mut cfg = base_config();

	cfg.layout.gutter_px = f64::NAN;

	let err = reverie_config::validate(&cfg).expect_err("Expected finite validation error.");

	assert!(
		err.to_string().contains("layout.gutter_px must be a finite number."),
		"Unexpected error: {err}"
	);
}

#[test]
fn layout_height_must_not_drop_past_threshold() {
	let mut cfg = base_config();

	cfg.layout.per_item_height_vh = 40.0;

	let err = reverie_config::validate(&cfg).expect_err("Expected height continuity error.");

	assert!(err.to_string().contains("layout.per_item_height_vh"), "Unexpected error: {err}");

	cfg.layout.height_threshold = 7;

	assert!(reverie_config::validate(&cfg).is_ok());
}

#[test]
fn layout_end_offset_cannot_exceed_start() {
	let mut cfg = base_config();

	cfg.layout.end_offset_pct = 5.0;

	let err = reverie_config::validate(&cfg).expect_err("Expected offset ordering error.");

	assert!(
		err.to_string().contains("layout.end_offset_pct must not exceed layout.start_offset_pct."),
		"Unexpected error: {err}"
	);
}
