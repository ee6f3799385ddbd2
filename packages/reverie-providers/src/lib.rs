pub mod feed;
pub mod objects;
pub mod rest;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};

use reverie_config::Backend;

const APIKEY: HeaderName = HeaderName::from_static("apikey");
const MAX_ERROR_BODY_CHARS: usize = 512;

pub fn auth_headers(cfg: &Backend) -> Result<HeaderMap> {
	let token = cfg.access_token.as_deref().unwrap_or(&cfg.api_key);
	let mut headers = HeaderMap::new();

	headers.insert(APIKEY, HeaderValue::from_str(&cfg.api_key)?);
	headers.insert(AUTHORIZATION, format!("Bearer {token}").parse()?);

	Ok(headers)
}

pub(crate) fn client(cfg: &Backend) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

/// Passes successful responses through and turns everything else into [`Error::Status`] with a
/// bounded copy of the body.
pub(crate) async fn check_status(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}

	let body = res.text().await.unwrap_or_default();
	let body = body.chars().take(MAX_ERROR_BODY_CHARS).collect();

	Err(Error::Status { status: status.as_u16(), body })
}
