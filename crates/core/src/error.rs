use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// A user id was supplied without the rest of the on-premise credentials.
	#[error("on-premise authentication requires both password and tenant")]
	InvalidCredentials,

	#[error("unable to determine an authentication mode; supply a user id or a refresh token")]
	NoCredentials,

	/// The authorization server answered but refused the credentials.
	#[error("authentication rejected: {0}")]
	AuthRejected(String),

	#[error("cached topology is invalid; re-authenticate to reset")]
	UnknownTopology,

	/// A value the operation needs is neither cached nor supplied as a flag.
	#[error("missing required setting: {0}")]
	MissingSetting(&'static str),

	#[error("unable to resolve a home directory for the config store")]
	NoHomeDirectory,

	#[error("config file {path} is corrupt")]
	ConfigCorrupt {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("failed to persist config to {path}")]
	PersistFailed {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Network-level failure, or an error response whose body could not be read.
	#[error("transport error: {0}")]
	Transport(String),

	#[error("API request failed with status {status}: {message}")]
	Api {
		status: u16,
		code: Option<i64>,
		message: String,
	},

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		Error::Transport(err.to_string())
	}
}
