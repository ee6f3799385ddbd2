use reqwest::header::AUTHORIZATION;

use reverie_config::Backend;
use reverie_providers::{objects, rest};

fn backend(access_token: Option<&str>) -> Backend {
	Backend {
		url: "https://example.supabase.co".to_string(),
		api_key: "anon".to_string(),
		access_token: access_token.map(str::to_string),
		table: "memories".to_string(),
		bucket: "memories".to_string(),
		timeout_ms: 1_000,
	}
}

#[test]
fn bearer_falls_back_to_api_key() {
	let headers =
		reverie_providers::auth_headers(&backend(None)).expect("Failed to build headers.");

	assert_eq!(headers.get(AUTHORIZATION).expect("Missing authorization header."), "Bearer anon");
	assert_eq!(headers.get("apikey").expect("Missing apikey header."), "anon");
}

#[test]
fn bearer_prefers_session_token() {
	let headers = reverie_providers::auth_headers(&backend(Some("user-jwt")))
		.expect("Failed to build headers.");

	assert_eq!(
		headers.get(AUTHORIZATION).expect("Missing authorization header."),
		"Bearer user-jwt"
	);
	assert_eq!(headers.get("apikey").expect("Missing apikey header."), "anon");
}

#[test]
fn builds_table_and_object_urls() {
	let cfg = backend(None);

	assert_eq!(rest::table_url(&cfg), "https://example.supabase.co/rest/v1/memories");
	assert_eq!(
		objects::object_url(&cfg, "abc.jpg"),
		"https://example.supabase.co/storage/v1/object/memories/abc.jpg"
	);
	assert_eq!(
		objects::public_url(&cfg, "/abc.jpg"),
		"https://example.supabase.co/storage/v1/object/public/memories/abc.jpg"
	);
}

#[test]
fn status_errors_expose_http_code() {
	let err = reverie_providers::Error::Status { status: 403, body: "denied".to_string() };

	assert_eq!(err.status(), Some(403));
	assert!(err.to_string().contains("HTTP 403"));
}
