use serde::Serialize;
use tracing::debug;
use uipo::record::overwrite;
use uipo::{SessionRecord, TargetFolder, Topology};

use super::def::{BoxFut, CommandDef, ExecCtx};
use crate::cli::PlatformSetupArgs;
use crate::error::Result;
use crate::output::{TextBlock, TextReport, render_blocks};

pub struct PlatformSetupCommand;

/// Cached settings after the update. Secrets are reported only as present
/// or absent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
	pub topology: Topology,
	pub api_endpoint: String,
	pub authorization_endpoint: String,
	pub tenant_alias: String,
	pub service_alias: String,
	pub client_id: String,
	pub refresh_token_cached: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub folder: Option<String>,
}

impl From<&SessionRecord> for PlatformSettings {
	fn from(record: &SessionRecord) -> Self {
		Self {
			topology: record.topology,
			api_endpoint: record.api_endpoint.clone(),
			authorization_endpoint: record.authorization_endpoint.clone(),
			tenant_alias: record.tenant_alias.clone(),
			service_alias: record.service_alias.clone(),
			client_id: record.client_id.clone(),
			refresh_token_cached: !record.refresh_token.is_empty(),
			folder: record.target_folder.as_ref().map(|f| f.name.clone()),
		}
	}
}

impl TextReport for PlatformSettings {
	fn render_text(&self) -> String {
		let block = TextBlock::new()
			.row("Topology", self.topology)
			.row("API Endpoint", &self.api_endpoint)
			.row("Auth Endpoint", &self.authorization_endpoint)
			.row("Tenant Alias", &self.tenant_alias)
			.row("Service Alias", &self.service_alias)
			.row("Client ID", &self.client_id)
			.row("Refresh Token", if self.refresh_token_cached { "cached" } else { "not set" })
			.opt_row("Folder", self.folder.as_deref());
		render_blocks(Some("Platform settings saved"), &[block])
	}
}

/// Points the target folder at `name`. A different name discards the cached
/// folder id and details, which belonged to the previous folder.
fn set_folder(record: &mut SessionRecord, name: &str) {
	if record.target_folder.as_ref().is_some_and(|folder| folder.name == name) {
		return;
	}
	record.target_folder = Some(TargetFolder {
		name: name.to_string(),
		..Default::default()
	});
}

impl CommandDef for PlatformSetupCommand {
	const NAME: &'static str = "platform-setup";

	type Args = PlatformSetupArgs;
	type Data = PlatformSettings;

	fn setup(args: &Self::Args, record: &mut SessionRecord) -> Result<()> {
		let mut changed = false;
		changed |= overwrite(&mut record.api_endpoint, args.api_endpoint.as_deref());
		changed |= overwrite(&mut record.authorization_endpoint, args.auth_endpoint.as_deref());
		changed |= overwrite(&mut record.refresh_token, args.refresh_token.as_deref());
		changed |= overwrite(&mut record.tenant_alias, args.tenant_alias.as_deref());
		changed |= overwrite(&mut record.service_alias, args.service_alias.as_deref());
		changed |= overwrite(&mut record.client_id, args.client_id.as_deref());
		if let Some(folder) = &args.folder {
			set_folder(record, folder);
		}
		debug!(target = "uipo.cli", changed, "platform settings merged");
		Ok(())
	}

	fn execute<'a>(_args: &'a Self::Args, exec: ExecCtx<'a>) -> BoxFut<'a, Result<Self::Data>> {
		Box::pin(async move { Ok(PlatformSettings::from(&*exec.record)) })
	}
}
