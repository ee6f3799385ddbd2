pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("Backend responded with HTTP {status}: {body}")]
	Status { status: u16, body: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	/// HTTP status of a rejected request, if the backend answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Reqwest(err) => err.status().map(|status| status.as_u16()),
			_ => None,
		}
	}
}
