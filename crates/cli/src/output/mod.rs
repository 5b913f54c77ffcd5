//! Structured output envelope for all CLI commands.
//!
//! Text output (the default) prints aligned `label: value` blocks. JSON output
//! wraps every command in the same envelope:
//!
//! ```json
//! { "ok": true, "command": "robots", "data": { ... } }
//! ```
//!
//! On failure:
//!
//! ```json
//! {
//!   "ok": false,
//!   "command": "robots",
//!   "error": { "code": "SESSION_ERROR", "message": "cached topology is invalid; re-authenticate to reset" }
//! }
//! ```


use std::fmt::Display;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// JSON envelope
	Json,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Text => write!(f, "text"),
			OutputFormat::Json => write!(f, "json"),
		}
	}
}

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,

	/// Command name (e.g., "authenticate", "addq")
	pub command: String,

	/// Command-specific result data (only present on success)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	/// Error information (only present on failure)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
}

/// Error information for failed commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Invalid input provided
	InvalidInput,
	/// Credentials missing, malformed or refused
	AuthError,
	/// Cached session cannot be used (unknown topology, missing setting)
	SessionError,
	/// Config store unreadable or unlocatable
	ConfigError,
	/// Command succeeded but the session could not be cached
	PersistFailed,
	/// Network failure or unreadable error response
	TransportError,
	/// Server reported an error
	ApiError,
	/// File I/O error
	IoError,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let code = match self {
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::AuthError => "AUTH_ERROR",
			ErrorCode::SessionError => "SESSION_ERROR",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::PersistFailed => "PERSIST_FAILED",
			ErrorCode::TransportError => "TRANSPORT_ERROR",
			ErrorCode::ApiError => "API_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		};
		f.write_str(code)
	}
}

/// Builder for creating command results
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
		}
	}

	/// Set the successful result data
	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	/// Set an error
	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
			details: None,
		});
		self
	}

	/// Set a fully built error (code, message and details)
	pub fn command_error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		CommandResult {
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
		}
	}
}

/// Human-readable rendering of a command's data.
pub trait TextReport {
	fn render_text(&self) -> String;
}

impl TextReport for () {
	fn render_text(&self) -> String {
		String::new()
	}
}

/// A group of `label: value` rows printed with right-aligned labels.
#[derive(Debug, Default, Clone)]
pub struct TextBlock {
	rows: Vec<(&'static str, String)>,
}

impl TextBlock {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn row(mut self, label: &'static str, value: impl Display) -> Self {
		self.rows.push((label, value.to_string()));
		self
	}

	/// Adds the row only when `value` is present.
	pub fn opt_row(self, label: &'static str, value: Option<impl Display>) -> Self {
		match value {
			Some(value) => self.row(label, value),
			None => self,
		}
	}

	pub fn render(&self) -> String {
		let width = self.rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
		let mut out = String::new();
		for (label, value) in &self.rows {
			out.push_str(&format!("{label:>width$}: {value}\n"));
		}
		out
	}
}

/// Renders an optional headline followed by blank-line separated blocks.
pub fn render_blocks(headline: Option<&str>, blocks: &[TextBlock]) -> String {
	let mut out = String::new();
	if let Some(headline) = headline {
		out.push_str(headline);
		out.push_str("\n\n");
	}
	for block in blocks {
		out.push_str(&block.render());
		out.push('\n');
	}
	out
}

/// Print a command result to stdout in the specified format
pub fn print_result<T: Serialize + TextReport>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => print_result_text(result),
	}
}

fn print_result_text<T: Serialize + TextReport>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		if let Some(ref data) = result.data {
			let _ = write!(stdout, "{}", data.render_text());
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "Error [{}]: {}", error.code, error.message);
	}
}

/// Print an error to stderr in human-readable format
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("Error [{}]: {}", error.code, error.message);
}
