use reqwest::header::CONTENT_TYPE;

use crate::Result;
use reverie_config::Backend;

pub fn object_url(cfg: &Backend, path: &str) -> String {
	format!("{}/storage/v1/object/{}/{}", cfg.url, cfg.bucket, path.trim_start_matches('/'))
}

/// URL the stored object is readable at without credentials.
pub fn public_url(cfg: &Backend, path: &str) -> String {
	format!("{}/storage/v1/object/public/{}/{}", cfg.url, cfg.bucket, path.trim_start_matches('/'))
}

pub async fn upload(cfg: &Backend, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
	let res = crate::client(cfg)?
		.post(object_url(cfg, path))
		.headers(crate::auth_headers(cfg)?)
		.header(CONTENT_TYPE, content_type)
		.body(bytes)
		.send()
		.await?;

	crate::check_status(res).await?;

	Ok(())
}
