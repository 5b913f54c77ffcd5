use serde::{Deserialize, Serialize};
use tracing::info;
use uipo::endpoint::paths;
use uipo::{SessionClient, TargetFolder};

use super::apply_resource_flags;
use super::def::{BoxFut, CommandDef, ExecCtx};
use crate::cli::FoldersArgs;
use crate::error::{CliError, Result};
use crate::output::{TextBlock, TextReport, render_blocks};

pub struct FoldersCommand;

/// Folder entry as returned by both folder navigation endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Folder {
	pub id: i64,
	#[serde(default)]
	pub display_name: String,
	#[serde(default)]
	pub fully_qualified_name: String,
	pub description: Option<String>,
	pub parent_id: Option<i64>,
	/// Only the unfiltered listing reports this.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub has_children: Option<bool>,
}

impl From<&Folder> for TargetFolder {
	fn from(folder: &Folder) -> Self {
		TargetFolder {
			id: folder.id,
			name: folder.display_name.clone(),
			fully_qualified_name: folder.fully_qualified_name.clone(),
			description: folder.description.clone().unwrap_or_default(),
			parent_id: folder.parent_id.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct FilteredPage {
	#[serde(rename = "PageItems", default)]
	page_items: Vec<Folder>,
	#[serde(rename = "Count", default)]
	count: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldersData {
	/// Total matches reported by the server (filtered listing only).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub total: Option<u64>,
	pub folders: Vec<Folder>,
	/// Name of the folder stored as the default, when `--set-default` was given.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default_folder: Option<String>,
}

impl TextReport for FoldersData {
	fn render_text(&self) -> String {
		if self.folders.is_empty() {
			return render_blocks(Some("No folders returned"), &[]);
		}
		let blocks: Vec<_> = self
			.folders
			.iter()
			.map(|folder| {
				TextBlock::new()
					.row("Folder ID", folder.id)
					.row("Display Name", &folder.display_name)
					.row("Fully Qualified Name", &folder.fully_qualified_name)
					.row("Description", folder.description.as_deref().unwrap_or(""))
					.opt_row("Has Children", folder.has_children)
					.opt_row("Parent ID", folder.parent_id)
			})
			.collect();
		let headline = self.default_folder.as_ref().map(|name| format!("Default folder set to {name}"));
		render_blocks(headline.as_deref(), &blocks)
	}
}

impl CommandDef for FoldersCommand {
	const NAME: &'static str = "folders";

	type Args = FoldersArgs;
	type Data = FoldersData;

	fn setup(args: &Self::Args, record: &mut uipo::SessionRecord) -> Result<()> {
		apply_resource_flags(&args.resource, record);
		Ok(())
	}

	fn execute<'a>(args: &'a Self::Args, exec: ExecCtx<'a>) -> BoxFut<'a, Result<Self::Data>> {
		Box::pin(async move {
			let client = SessionClient::new(exec.http, &*exec.record)?;

			let (folders, total, api_version) = match &args.filter {
				Some(filter) => {
					let url = client.url(paths::FILTERED_FOLDERS)?;
					let query = [
						("searchText", filter.clone()),
						("skip", args.skip.to_string()),
						("take", args.take.to_string()),
					];
					let response = client.get(&url, &query, &[]).await?;
					let page: FilteredPage = response.json()?;
					(page.page_items, page.count, response.api_version)
				}
				None => {
					let url = client.url(paths::ALL_FOLDERS)?;
					let response = client.get(&url, &[], &[]).await?;
					let folders: Vec<Folder> = response.json()?;
					(folders, None, response.api_version)
				}
			};
			exec.record.note_api_version(api_version.as_deref());

			let default_folder = if args.set_default {
				let first = folders
					.first()
					.ok_or_else(|| CliError::InvalidInput("no folders returned; nothing to set as default".into()))?;
				info!(target = "uipo.cli", folder = %first.display_name, id = first.id, "default folder set");
				exec.record.target_folder = Some(TargetFolder::from(first));
				Some(first.display_name.clone())
			} else {
				None
			};

			Ok(FoldersData {
				total,
				folders,
				default_folder,
			})
		})
	}
}
