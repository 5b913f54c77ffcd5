use std::path::Path;

use anyhow::Context;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uipo::endpoint::paths;
use uipo::{RequestBody, SessionClient};

use super::def::{BoxFut, CommandDef, ExecCtx};
use super::{ODataCollection, apply_resource_flags};
use crate::cli::PushArgs;
use crate::error::Result;
use crate::output::{TextBlock, TextReport, render_blocks};

pub struct PushCommand;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UploadEntry {
	#[serde(default)]
	key: String,
	#[serde(default)]
	status: String,
	body: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushData {
	pub key: String,
	pub status: String,
	pub file_size: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
}

impl TextReport for PushData {
	fn render_text(&self) -> String {
		let block = TextBlock::new()
			.row("Package File", &self.key)
			.row("File Size", self.file_size)
			.row("Status", &self.status)
			.opt_row("Detail", self.detail.as_deref());
		render_blocks(Some("Package uploaded successfully"), &[block])
	}
}

/// Reads the package and wraps it as the single `file` part of the form.
async fn package_form(path: &Path) -> Result<(Form, u64)> {
	let file_name = path
		.file_name()
		.and_then(|name| name.to_str())
		.with_context(|| format!("package path {} has no file name", path.display()))?
		.to_string();
	let bytes = tokio::fs::read(path)
		.await
		.with_context(|| format!("failed to read package {}", path.display()))?;
	let size = bytes.len() as u64;
	debug!(target = "uipo.cli", file = %file_name, size, "package read");

	let part = Part::bytes(bytes)
		.file_name(file_name)
		.mime_str("application/octet-stream")
		.map_err(uipo::Error::from)?;
	Ok((Form::new().part("file", part), size))
}

impl CommandDef for PushCommand {
	const NAME: &'static str = "push";

	type Args = PushArgs;
	type Data = PushData;

	fn setup(args: &Self::Args, record: &mut uipo::SessionRecord) -> Result<()> {
		apply_resource_flags(&args.resource, record);
		Ok(())
	}

	fn execute<'a>(args: &'a Self::Args, exec: ExecCtx<'a>) -> BoxFut<'a, Result<Self::Data>> {
		Box::pin(async move {
			let client = SessionClient::new(exec.http, &*exec.record)?;
			let url = client.url(paths::UPLOAD_PACKAGE)?;
			let (form, file_size) = package_form(&args.package).await?;

			let response = client
				.execute(reqwest::Method::POST, &url, RequestBody::Multipart(form), &[])
				.await?;
			let uploaded: ODataCollection<UploadEntry> = response.json()?;
			exec.record.note_api_version(response.api_version.as_deref());

			let entry = uploaded
				.value
				.into_iter()
				.next()
				.context("upload response listed no packages")?;
			Ok(PushData {
				key: entry.key,
				status: entry.status,
				file_size,
				detail: entry.body.filter(|body| !body.is_empty()),
			})
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::CliError;
	use crate::output::ErrorCode;

	#[tokio::test]
	async fn missing_package_is_an_io_error() {
		let dir = tempfile::TempDir::new().unwrap();
		let err = package_form(&dir.path().join("absent.nupkg")).await.unwrap_err();
		assert!(matches!(err, CliError::Anyhow(_)));
		let cmd = err.to_command_error();
		assert_eq!(cmd.code, ErrorCode::IoError);
		assert!(cmd.message.contains("absent.nupkg"), "{}", cmd.message);
	}

	#[tokio::test]
	async fn package_size_is_reported() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("Process.1.0.0.nupkg");
		std::fs::write(&path, b"PK\x03\x04 not really a zip").unwrap();
		let (_form, size) = package_form(&path).await.unwrap();
		assert_eq!(size, 21);
	}
}
