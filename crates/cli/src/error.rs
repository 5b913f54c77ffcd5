use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	/// Flag values that parse but cannot be used (bad JSON content, empty
	/// folder result with `--set-default`).
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error(transparent)]
	Core(#[from] uipo::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, message, details) = match self {
			CliError::InvalidInput(msg) => (ErrorCode::InvalidInput, msg.clone(), None),
			CliError::Core(err) => classify_core_error(err),
			CliError::Io(err) => (ErrorCode::IoError, err.to_string(), None),
			CliError::Anyhow(err) => {
				let code = if err.root_cause().downcast_ref::<std::io::Error>().is_some() {
					ErrorCode::IoError
				} else {
					ErrorCode::InternalError
				};
				(code, format!("{err:#}"), None)
			}
		};

		CommandError {
			code,
			message,
			details,
		}
	}
}

fn classify_core_error(err: &uipo::Error) -> (ErrorCode, String, Option<serde_json::Value>) {
	use uipo::Error;

	let message = render_chain(err);
	match err {
		Error::InvalidCredentials | Error::NoCredentials | Error::AuthRejected(_) => (ErrorCode::AuthError, message, None),
		Error::UnknownTopology | Error::MissingSetting(_) => (ErrorCode::SessionError, message, None),
		Error::NoHomeDirectory | Error::ConfigCorrupt { .. } => (ErrorCode::ConfigError, message, None),
		Error::PersistFailed { path, .. } => (
			ErrorCode::PersistFailed,
			message,
			Some(serde_json::json!({ "path": path })),
		),
		Error::Transport(_) => (ErrorCode::TransportError, message, None),
		Error::Api { status, code, .. } => (
			ErrorCode::ApiError,
			message,
			Some(serde_json::json!({ "status": status, "errorCode": code })),
		),
		Error::Io(_) => (ErrorCode::IoError, message, None),
		Error::Json(_) => (ErrorCode::InternalError, format!("unexpected response shape: {message}"), None),
	}
}

/// Joins an error and its sources as `outer: inner: root`.
fn render_chain(err: &dyn std::error::Error) -> String {
	let mut message = err.to_string();
	let mut source = err.source();
	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());
		source = cause.source();
	}
	message
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;

	#[test]
	fn api_error_keeps_status_and_code() {
		let err = CliError::from(uipo::Error::Api {
			status: 404,
			code: Some(1008),
			message: "not found".into(),
		});
		let cmd = err.to_command_error();
		assert_eq!(cmd.code, ErrorCode::ApiError);
		assert!(cmd.message.contains("not found"));
		let details = cmd.details.unwrap();
		assert_eq!(details["status"], 404);
		assert_eq!(details["errorCode"], 1008);
	}

	#[test]
	fn persist_failure_reports_source_and_path() {
		let err = CliError::from(uipo::Error::PersistFailed {
			path: PathBuf::from("/tmp/.uipo/config.json"),
			source: std::io::Error::other("disk full"),
		});
		let cmd = err.to_command_error();
		assert_eq!(cmd.code, ErrorCode::PersistFailed);
		assert!(cmd.message.ends_with(": disk full"), "{}", cmd.message);
		assert_eq!(cmd.details.unwrap()["path"], "/tmp/.uipo/config.json");
	}

	#[test]
	fn unknown_topology_is_a_session_error() {
		let cmd = CliError::from(uipo::Error::UnknownTopology).to_command_error();
		assert_eq!(cmd.code, ErrorCode::SessionError);
		assert_eq!(cmd.message, "cached topology is invalid; re-authenticate to reset");
	}

	#[test]
	fn credential_errors_are_auth_errors() {
		for err in [uipo::Error::InvalidCredentials, uipo::Error::NoCredentials, uipo::Error::AuthRejected("no".into())] {
			assert_eq!(CliError::from(err).to_command_error().code, ErrorCode::AuthError);
		}
	}
}
