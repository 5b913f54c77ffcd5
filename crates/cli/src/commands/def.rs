//! Command plumbing: setup + execute contract shared by every command.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use uipo::{RuntimeOverrides, SessionRecord};

use crate::error::Result;
use crate::output::TextReport;

/// Everything a command may touch while it runs.
pub struct ExecCtx<'a> {
	/// Shared HTTP client (proxy and certificate policy already applied).
	pub http: &'a reqwest::Client,

	/// Environment and global-flag overrides.
	pub overrides: &'a RuntimeOverrides,

	/// The session loaded for this invocation. Changes are persisted only when
	/// the command succeeds.
	pub record: &'a mut SessionRecord,
}

/// Boxing alias: stable async in trait without `async_trait`.
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Canonical command trait. Each command module becomes
/// `pub struct XxxCommand; impl CommandDef for XxxCommand { ... }`
pub trait CommandDef: 'static {
	const NAME: &'static str;

	type Args;
	type Data: Serialize + TextReport;

	/// Merge explicitly supplied flags into the record. Runs before `execute`.
	fn setup(_args: &Self::Args, _record: &mut SessionRecord) -> Result<()> {
		Ok(())
	}

	/// Execute the command. **Must not print**. The dispatcher prints and
	/// persists.
	fn execute<'a>(args: &'a Self::Args, exec: ExecCtx<'a>) -> BoxFut<'a, Result<Self::Data>>;
}
