//! Command dispatch: load the session, run one command, persist on success.

mod authenticate;
mod def;
mod folders;
mod platform_setup;
mod queue;
mod robots;
mod upload;

use tracing::{debug, info};
use uipo::record::overwrite;
use uipo::{ConfigStore, RuntimeOverrides, SessionRecord, build_http_client};

pub use self::authenticate::AuthenticateCommand;
pub use self::def::{BoxFut, CommandDef, ExecCtx};
pub use self::folders::FoldersCommand;
pub use self::platform_setup::PlatformSetupCommand;
pub use self::queue::AddQueueItemCommand;
pub use self::robots::RobotsCommand;
pub use self::upload::PushCommand;
use crate::cli::{Cli, Commands, ResourceArgs};
use crate::error::Result;
use crate::output::{self, OutputFormat, ResultBuilder};

/// Per-invocation collaborators, built once in [`dispatch`].
struct Runtime<'a> {
	store: &'a ConfigStore,
	http: &'a reqwest::Client,
	overrides: &'a RuntimeOverrides,
	format: OutputFormat,
}

pub async fn dispatch(cli: Cli) -> Result<()> {
	let overrides = RuntimeOverrides::from_env().with_flags(cli.verbose, cli.insecure);
	let store = ConfigStore::resolve(&overrides)?;
	let mut record = store.load()?;
	let http = build_http_client(&overrides)?;

	let runtime = Runtime {
		store: &store,
		http: &http,
		overrides: &overrides,
		format: cli.format,
	};

	match cli.command {
		Commands::Authenticate(args) => run::<AuthenticateCommand>(&args, &runtime, &mut record).await,
		Commands::PlatformSetup(args) => run::<PlatformSetupCommand>(&args, &runtime, &mut record).await,
		Commands::Robots(args) => run::<RobotsCommand>(&args, &runtime, &mut record).await,
		Commands::Folders(args) => run::<FoldersCommand>(&args, &runtime, &mut record).await,
		Commands::Addq(args) => run::<AddQueueItemCommand>(&args, &runtime, &mut record).await,
		Commands::Push(args) => run::<PushCommand>(&args, &runtime, &mut record).await,
	}
}

async fn run<C: CommandDef>(args: &C::Args, runtime: &Runtime<'_>, record: &mut SessionRecord) -> Result<()> {
	C::setup(args, record)?;

	debug!(target = "uipo.cli", command = C::NAME, "executing");
	let exec = ExecCtx {
		http: runtime.http,
		overrides: runtime.overrides,
		record: &mut *record,
	};
	let data = C::execute(args, exec).await?;

	let result = ResultBuilder::new(C::NAME).data(data).build();
	output::print_result(&result, runtime.format);

	runtime.store.persist(record).await?;
	info!(target = "uipo.cli", command = C::NAME, path = %runtime.store.path().display(), "session saved");
	Ok(())
}

/// OData collection envelope: `{"@odata.count": n, "value": [...]}`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ODataCollection<T> {
	#[serde(rename = "@odata.count", default)]
	pub count: Option<u64>,
	#[serde(default = "Vec::new")]
	pub value: Vec<T>,
}

/// Overwrites cached endpoint and aliases with any supplied resource flags.
pub(crate) fn apply_resource_flags(flags: &ResourceArgs, record: &mut SessionRecord) {
	overwrite(&mut record.api_endpoint, flags.api_endpoint.as_deref());
	overwrite(&mut record.tenant_alias, flags.tenant_alias.as_deref());
	overwrite(&mut record.service_alias, flags.service_alias.as_deref());
}
