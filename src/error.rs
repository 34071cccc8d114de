//! Errors surfaced by the REST collaborators.

/// Failure of a persistence or auth call, classified by how the UI reacts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
	/// Rejected input (bad id, empty title, short password, malformed email).
	#[error("{0}")]
	Validation(String),
	#[error("{0}")]
	NotFound(String),
	/// Missing, invalid or expired token, wrong credentials, duplicate account.
	#[error("{0}")]
	Auth(String),
	/// The request never produced a readable response.
	#[error("network error: {0}")]
	Network(String),
	#[error("server error ({status}): {message}")]
	Server { status: u16, message: String },
}

impl ApiError {
	/// Classifies a non-success HTTP status.
	pub fn from_status(status: u16, message: impl Into<String>) -> Self {
		let message = message.into();
		match status {
			400 => ApiError::Validation(message),
			401 | 403 | 409 => ApiError::Auth(message),
			404 => ApiError::NotFound(message),
			_ => ApiError::Server { status, message },
		}
	}

	pub fn is_transient(&self) -> bool {
		matches!(self, ApiError::Network(_) | ApiError::Server { .. })
	}

	pub fn is_auth(&self) -> bool {
		matches!(self, ApiError::Auth(_))
	}
}

impl From<reqwest::Error> for ApiError {
	fn from(err: reqwest::Error) -> Self {
		ApiError::Network(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, ApiError>;
