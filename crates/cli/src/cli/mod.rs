
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::output::OutputFormat;

/// Root CLI for uipo.
#[derive(Parser, Debug)]
#[command(name = "uipo")]
#[command(about = "UiPath Orchestrator command-line client")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv dependency debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Skip TLS certificate verification
	#[arg(long = "unsafe", global = true)]
	pub insecure: bool,

	/// Output format: text (default) or json
	#[arg(long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Obtain a bearer token and cache it with the session.
	Authenticate(AuthenticateArgs),
	/// Store endpoints, aliases and the target folder without contacting the server.
	PlatformSetup(PlatformSetupArgs),
	/// List robots visible in the target folder.
	Robots(RobotsArgs),
	/// List folders, optionally filtered, and pick a default one.
	Folders(FoldersArgs),
	/// Add an item to a queue.
	Addq(AddQueueItemArgs),
	/// Upload a NuGet package.
	Push(PushArgs),
}

impl Commands {
	/// Name used in output envelopes.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Authenticate(_) => "authenticate",
			Commands::PlatformSetup(_) => "platform-setup",
			Commands::Robots(_) => "robots",
			Commands::Folders(_) => "folders",
			Commands::Addq(_) => "addq",
			Commands::Push(_) => "push",
		}
	}
}

#[derive(Args, Debug, Clone, Default)]
pub struct AuthenticateArgs {
	/// Authorization endpoint (cached after a successful exchange)
	#[arg(short = 'e', long, value_name = "URL")]
	pub endpoint: Option<String>,

	/// On-premise tenancy name
	#[arg(short, long)]
	pub tenant: Option<String>,

	/// On-premise user name or email (falls back to UIPO_USERNAME)
	#[arg(short = 'u', long = "userid", value_name = "USER")]
	pub user_id: Option<String>,

	/// On-premise password (falls back to UIPO_PASSWORD)
	#[arg(short, long)]
	pub password: Option<String>,

	/// Hosted refresh token (cached after a successful exchange)
	#[arg(short, long, value_name = "TOKEN")]
	pub refresh_token: Option<String>,

	/// Hosted OAuth client id
	#[arg(short, long, value_name = "ID")]
	pub client_id: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PlatformSetupArgs {
	/// API endpoint base URL
	#[arg(short = 'e', long, value_name = "URL")]
	pub api_endpoint: Option<String>,

	/// Endpoint used to mint bearer tokens
	#[arg(short = 'u', long, value_name = "URL")]
	pub auth_endpoint: Option<String>,

	/// Hosted refresh token
	#[arg(short, long, value_name = "TOKEN")]
	pub refresh_token: Option<String>,

	/// Tenant (account) logical name
	#[arg(short = 'a', long = "alname", value_name = "NAME")]
	pub tenant_alias: Option<String>,

	/// Service logical name
	#[arg(short = 's', long = "slname", value_name = "NAME")]
	pub service_alias: Option<String>,

	/// Hosted OAuth client id
	#[arg(short, long, value_name = "ID")]
	pub client_id: Option<String>,

	/// Folder used for subsequent folder-scoped calls
	#[arg(short = 'f', long = "folder", value_name = "NAME")]
	pub folder: Option<String>,
}

/// Flags shared by every resource command. Supplied values overwrite the
/// cached ones.
#[derive(Args, Debug, Clone, Default)]
pub struct ResourceArgs {
	/// API endpoint base URL
	#[arg(short = 'e', long, value_name = "URL")]
	pub api_endpoint: Option<String>,

	/// Tenant (account) logical name
	#[arg(short = 'a', long = "alname", value_name = "NAME")]
	pub tenant_alias: Option<String>,

	/// Service logical name
	#[arg(short = 's', long = "slname", value_name = "NAME")]
	pub service_alias: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RobotsArgs {
	#[command(flatten)]
	pub resource: ResourceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct FoldersArgs {
	#[command(flatten)]
	pub resource: ResourceArgs,

	/// Search text; switches to the paged, filtered listing
	#[arg(short = 'f', long, value_name = "TEXT")]
	pub filter: Option<String>,

	/// Entries to skip (filtered listing only)
	#[arg(short = 'x', long, default_value_t = 0)]
	pub skip: u32,

	/// Entries to return (filtered listing only)
	#[arg(short = 'y', long, default_value_t = 10)]
	pub take: u32,

	/// Store the first returned folder as the target folder
	#[arg(short = 'd', long)]
	pub set_default: bool,
}

/// Queue item priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
pub enum Priority {
	#[value(name = "Low")]
	Low,
	#[default]
	#[value(name = "Normal")]
	Normal,
	#[value(name = "High")]
	High,
}

#[derive(Args, Debug, Clone)]
pub struct AddQueueItemArgs {
	#[command(flatten)]
	pub resource: ResourceArgs,

	/// Queue name
	#[arg(short, long)]
	pub queue: String,

	#[arg(short, long, value_enum, ignore_case = true, default_value_t = Priority::Normal)]
	pub priority: Priority,

	/// Reference identifier; some queues require it to be unique
	#[arg(short, long)]
	pub reference: String,

	/// Item data as a JSON object, e.g. '{"Invoice":"A-17"}'
	#[arg(short = 'c', long = "content", value_name = "JSON")]
	pub content: Option<String>,

	/// UTC due date, YYYY-MM-DDTHH:MM:SS.sssZ
	#[arg(short = 'd', long = "deadline", value_name = "DATE")]
	pub deadline: Option<String>,

	/// UTC date before which the item must not be processed
	#[arg(long, value_name = "DATE")]
	pub postpone: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PushArgs {
	#[command(flatten)]
	pub resource: ResourceArgs,

	/// Path to the .nupkg file
	#[arg(short, long, value_name = "FILE")]
	pub package: PathBuf,
}
