pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Load failed: {message}")]
	Load { message: String },
	#[error("Not owner: {message}")]
	NotOwner { message: String },
	#[error("Transient failure: {message}")]
	Transient { message: String },
	#[error("Subscription failed: {message}")]
	Subscription { message: String },
}
impl Error {
	/// Text shown to the person using the timeline.
	pub fn user_message(&self) -> String {
		match self {
			Self::InvalidRequest { message } => message.clone(),
			Self::Load { .. } => "No memories yet.".to_string(),
			Self::NotOwner { .. } =>
				"Could not delete memory. You might not be the owner.".to_string(),
			Self::Transient { .. } => "Something went wrong. Please try again.".to_string(),
			Self::Subscription { .. } =>
				"Live updates are unavailable right now. New memories appear after a reload."
					.to_string(),
		}
	}
}
impl From<StoreError> for Error {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::NotOwner { message } => Self::NotOwner { message },
			StoreError::NotFound { message } | StoreError::Transient { message } =>
				Self::Transient { message },
		}
	}
}

/// Failure reported by a record store or blob storage.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	#[error("Not owner: {message}")]
	NotOwner { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Transient: {message}")]
	Transient { message: String },
}
impl From<reverie_providers::Error> for StoreError {
	fn from(err: reverie_providers::Error) -> Self {
		let message = err.to_string();

		match err.status() {
			Some(401 | 403) => Self::NotOwner { message },
			Some(404) => Self::NotFound { message },
			_ => Self::Transient { message },
		}
	}
}
