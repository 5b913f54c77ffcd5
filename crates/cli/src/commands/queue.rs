use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uipo::endpoint::paths;
use uipo::{RequestBody, SessionClient};

use super::apply_resource_flags;
use super::def::{BoxFut, CommandDef, ExecCtx};
use crate::cli::{AddQueueItemArgs, Priority};
use crate::error::{CliError, Result};
use crate::output::{TextBlock, TextReport, render_blocks};

pub struct AddQueueItemCommand;

#[derive(Debug, Serialize)]
struct AddQueueItemRequest<'a> {
	#[serde(rename = "itemData")]
	item_data: QueueItemData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct QueueItemData<'a> {
	name: &'a str,
	priority: Priority,
	specific_content: Map<String, Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	defer_date: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	due_date: Option<&'a str>,
	reference: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueItem {
	pub id: i64,
	#[serde(default)]
	pub creation_time: String,
	#[serde(default)]
	pub status: String,
	#[serde(default)]
	pub reference: String,
	pub queue_definition_id: Option<i64>,
}

impl TextReport for QueueItem {
	fn render_text(&self) -> String {
		let block = TextBlock::new()
			.row("Item ID", self.id)
			.row("Creation Time", &self.creation_time)
			.row("Status", &self.status);
		render_blocks(Some("Queue item created successfully"), &[block])
	}
}

/// Parses `--content` into the item's specific content. Absent content is an
/// empty object; anything other than a JSON object is rejected.
fn specific_content(raw: Option<&str>) -> Result<Map<String, Value>> {
	let Some(raw) = raw else {
		return Ok(Map::new());
	};
	match serde_json::from_str::<Value>(raw) {
		Ok(Value::Object(map)) => Ok(map),
		Ok(other) => Err(CliError::InvalidInput(format!(
			"--content must be a JSON object, got {}",
			json_kind(&other)
		))),
		Err(err) => Err(CliError::InvalidInput(format!("--content is not valid JSON: {err}"))),
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

fn request_body(args: &AddQueueItemArgs) -> Result<Value> {
	let request = AddQueueItemRequest {
		item_data: QueueItemData {
			name: &args.queue,
			priority: args.priority,
			specific_content: specific_content(args.content.as_deref())?,
			defer_date: args.postpone.as_deref(),
			due_date: args.deadline.as_deref(),
			reference: &args.reference,
		},
	};
	Ok(serde_json::to_value(request).map_err(uipo::Error::from)?)
}

impl CommandDef for AddQueueItemCommand {
	const NAME: &'static str = "addq";

	type Args = AddQueueItemArgs;
	type Data = QueueItem;

	fn setup(args: &Self::Args, record: &mut uipo::SessionRecord) -> Result<()> {
		apply_resource_flags(&args.resource, record);
		Ok(())
	}

	fn execute<'a>(args: &'a Self::Args, exec: ExecCtx<'a>) -> BoxFut<'a, Result<Self::Data>> {
		Box::pin(async move {
			let body = request_body(args)?;

			let client = SessionClient::new(exec.http, &*exec.record)?;
			let url = client.url(paths::ADD_QUEUE_ITEM)?;
			let headers: Vec<_> = client.folder_header().into_iter().collect();
			let response = client.execute(reqwest::Method::POST, &url, RequestBody::Json(body), &headers).await?;

			let item: QueueItem = response.json()?;
			exec.record.note_api_version(response.api_version.as_deref());
			Ok(item)
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn args(content: Option<&str>) -> AddQueueItemArgs {
		AddQueueItemArgs {
			resource: Default::default(),
			queue: "Invoices".into(),
			priority: Priority::High,
			reference: "A-17".into(),
			content: content.map(str::to_string),
			deadline: Some("2026-11-01T00:00:00.000Z".into()),
			postpone: None,
		}
	}

	#[test]
	fn content_is_merged_as_structured_value() {
		let body = request_body(&args(Some(r#"{"Amount": 12.5, "Lines": [1, 2], "Note": "a \"quoted\" value"}"#))).unwrap();
		assert_eq!(
			body,
			json!({
				"itemData": {
					"Name": "Invoices",
					"Priority": "High",
					"SpecificContent": { "Amount": 12.5, "Lines": [1, 2], "Note": "a \"quoted\" value" },
					"DueDate": "2026-11-01T00:00:00.000Z",
					"Reference": "A-17"
				}
			})
		);
	}

	#[test]
	fn absent_content_is_empty_object() {
		let body = request_body(&args(None)).unwrap();
		assert_eq!(body["itemData"]["SpecificContent"], json!({}));
		assert!(body["itemData"].get("DeferDate").is_none());
	}

	#[test]
	fn malformed_content_is_invalid_input() {
		assert!(matches!(request_body(&args(Some("{not json"))), Err(CliError::InvalidInput(_))));
		match request_body(&args(Some("[1,2]"))) {
			Err(CliError::InvalidInput(msg)) => assert!(msg.contains("an array"), "{msg}"),
			other => panic!("expected InvalidInput, got {other:?}"),
		}
	}
}
