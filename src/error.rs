//! Errors surfaced by the REST client and the config loader.

/// Failure fetching from the state endpoint.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FetchError {
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Network(String),
	/// The server answered with a non-success status.
	#[error("{url} answered {status}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// The URL that was requested.
		url: String,
	},
	/// The body was not the expected JSON.
	#[error("unexpected response body: {0}")]
	Decode(String),
}

impl From<gloo_net::Error> for FetchError {
	fn from(e: gloo_net::Error) -> Self {
		match e {
			gloo_net::Error::SerdeError(e) => FetchError::Decode(e.to_string()),
			other => FetchError::Network(other.to_string()),
		}
	}
}

/// A query-string override that was rejected. The setting keeps its value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
	/// `api` was blank.
	#[error("ignoring empty api override")]
	EmptyApi,
	/// `refresh` was not a whole number of seconds.
	#[error("ignoring refresh interval '{0}'")]
	Refresh(String),
	/// `log` did not name a level.
	#[error("ignoring log level '{0}'")]
	LogLevel(String),
}
