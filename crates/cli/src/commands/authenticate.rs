use serde::Serialize;
use uipo::{AuthOutcome, AuthRequest, AuthResolver, Topology};

use super::def::{BoxFut, CommandDef, ExecCtx};
use crate::cli::AuthenticateArgs;
use crate::error::Result;
use crate::output::{TextBlock, TextReport, render_blocks};

pub struct AuthenticateCommand;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateData {
	/// `on-premise` (user name + password) or `refresh-token`.
	pub mode: &'static str,
	#[serde(flatten)]
	pub outcome: AuthOutcome,
}

impl TextReport for AuthenticateData {
	fn render_text(&self) -> String {
		let block = TextBlock::new()
			.row("Mode", self.mode)
			.row("Topology", self.outcome.topology)
			.row("Endpoint", &self.outcome.authorization_endpoint)
			.opt_row("Token Type", self.outcome.token_type.as_deref())
			.opt_row("Scope", self.outcome.scope.as_deref())
			.opt_row(
				"Expires",
				self.outcome.expires_at.map(|at| at.format("%Y-%m-%d %H:%M:%S %:z")),
			);
		render_blocks(Some("Authentication successful"), &[block])
	}
}

impl CommandDef for AuthenticateCommand {
	const NAME: &'static str = "authenticate";

	type Args = AuthenticateArgs;
	type Data = AuthenticateData;

	fn execute<'a>(args: &'a Self::Args, exec: ExecCtx<'a>) -> BoxFut<'a, Result<Self::Data>> {
		Box::pin(async move {
			let request = AuthRequest {
				authorization_endpoint: args.endpoint.clone(),
				tenant: args.tenant.clone(),
				user_id: args.user_id.clone(),
				password: args.password.clone(),
				refresh_token: args.refresh_token.clone(),
				client_id: args.client_id.clone(),
			}
			.with_ambient(exec.overrides);

			let outcome = AuthResolver::new(exec.http).authenticate(exec.record, &request).await?;
			let mode = match outcome.topology {
				Topology::OnPremise => "on-premise",
				_ => "refresh-token",
			};
			Ok(AuthenticateData { mode, outcome })
		})
	}
}
