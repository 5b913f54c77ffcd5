use serde::{Deserialize, Serialize};
use uipo::SessionClient;
use uipo::endpoint::paths;

use super::def::{BoxFut, CommandDef, ExecCtx};
use super::{ODataCollection, apply_resource_flags};
use crate::cli::RobotsArgs;
use crate::error::Result;
use crate::output::{TextBlock, TextReport, render_blocks};

pub struct RobotsCommand;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Robot {
	#[serde(default)]
	pub name: String,
	pub machine_id: Option<i64>,
	pub machine_name: Option<String>,
	pub version: Option<String>,
	pub license_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsData {
	pub count: u64,
	pub robots: Vec<Robot>,
}

impl TextReport for RobotsData {
	fn render_text(&self) -> String {
		if self.robots.is_empty() {
			return render_blocks(Some("No robots returned"), &[]);
		}
		let blocks: Vec<_> = self
			.robots
			.iter()
			.map(|robot| {
				TextBlock::new()
					.row("Robot Name", &robot.name)
					.opt_row("Machine ID", robot.machine_id)
					.opt_row("Machine Name", robot.machine_name.as_deref())
					.opt_row("Machine Version", robot.version.as_deref())
					.opt_row("License Key", robot.license_key.as_deref())
			})
			.collect();
		render_blocks(None, &blocks)
	}
}

impl CommandDef for RobotsCommand {
	const NAME: &'static str = "robots";

	type Args = RobotsArgs;
	type Data = RobotsData;

	fn setup(args: &Self::Args, record: &mut uipo::SessionRecord) -> Result<()> {
		apply_resource_flags(&args.resource, record);
		Ok(())
	}

	fn execute<'a>(_args: &'a Self::Args, exec: ExecCtx<'a>) -> BoxFut<'a, Result<Self::Data>> {
		Box::pin(async move {
			let client = SessionClient::new(exec.http, &*exec.record)?;
			let url = client.url(paths::ROBOTS)?;
			let headers: Vec<_> = client.folder_header().into_iter().collect();
			let response = client.get(&url, &[], &headers).await?;

			let page: ODataCollection<Robot> = response.json()?;
			exec.record.note_api_version(response.api_version.as_deref());

			Ok(RobotsData {
				count: page.count.unwrap_or(page.value.len() as u64),
				robots: page.value,
			})
		})
	}
}
