//! Authentication mode selection and credential exchange.
//!
//! Two mutually exclusive protocols exist, chosen by [`Credentials::select`]:
//!
//! 1. a user id selects [`Credentials::OnPremise`] (password and tenant required)
//! 2. otherwise a refresh token selects [`Credentials::Hosted`]
//! 3. otherwise there is nothing to authenticate with
//!
//! [`AuthResolver::authenticate`] performs the single POST for the selected
//! protocol and updates the in-memory [`SessionRecord`]. Persisting the record
//! is left to the caller.

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::overrides::RuntimeOverrides;
use crate::record::{DEFAULT_CLIENT_ID, SessionRecord, Topology};

/// Raw authentication inputs gathered from flags, environment and cache.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
	pub authorization_endpoint: Option<String>,
	pub tenant: Option<String>,
	pub user_id: Option<String>,
	pub password: Option<String>,
	pub refresh_token: Option<String>,
	pub client_id: Option<String>,
}

impl AuthRequest {
	/// Fills absent user id / password from `UIPO_USERNAME` / `UIPO_PASSWORD`.
	pub fn with_ambient(mut self, overrides: &RuntimeOverrides) -> Self {
		if self.user_id.is_none() {
			self.user_id = overrides.username.clone();
		}
		if self.password.is_none() {
			self.password = overrides.password.clone();
		}
		self
	}
}

/// Credentials for exactly one authentication protocol.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
	OnPremise {
		tenant_name: String,
		username: String,
		password: String,
	},
	Hosted {
		client_id: String,
		refresh_token: String,
	},
}

impl std::fmt::Debug for Credentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Credentials::OnPremise { tenant_name, username, .. } => f
				.debug_struct("OnPremise")
				.field("tenant_name", tenant_name)
				.field("username", username)
				.finish_non_exhaustive(),
			Credentials::Hosted { client_id, .. } => {
				f.debug_struct("Hosted").field("client_id", client_id).finish_non_exhaustive()
			}
		}
	}
}

fn present(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|v| !v.is_empty())
}

impl Credentials {
	/// Picks the protocol for `request`, falling back to the cached refresh
	/// token and client id in `record`.
	pub fn select(request: &AuthRequest, record: &SessionRecord) -> Result<Self> {
		if let Some(username) = present(&request.user_id) {
			let (Some(password), Some(tenant)) = (present(&request.password), present(&request.tenant)) else {
				return Err(Error::InvalidCredentials);
			};
			return Ok(Credentials::OnPremise {
				tenant_name: tenant.to_string(),
				username: username.to_string(),
				password: password.to_string(),
			});
		}

		let refresh_token = present(&request.refresh_token).or(Some(record.refresh_token.as_str()).filter(|t| !t.is_empty()));
		if let Some(refresh_token) = refresh_token {
			let client_id = present(&request.client_id)
				.or(Some(record.client_id.as_str()).filter(|c| !c.is_empty()))
				.unwrap_or(DEFAULT_CLIENT_ID);
			return Ok(Credentials::Hosted {
				client_id: client_id.to_string(),
				refresh_token: refresh_token.to_string(),
			});
		}

		Err(Error::NoCredentials)
	}

	pub fn topology(&self) -> Topology {
		match self {
			Credentials::OnPremise { .. } => Topology::OnPremise,
			Credentials::Hosted { .. } => Topology::Hosted,
		}
	}
}

#[derive(Debug, Serialize)]
struct OnPremiseRequest<'a> {
	#[serde(rename = "tenancyName")]
	tenant_name: &'a str,
	#[serde(rename = "usernameOrEmailAddress")]
	username: &'a str,
	password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OnPremiseResponse {
	result: Option<String>,
	success: bool,
	error: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct HostedRequest<'a> {
	grant_type: &'static str,
	client_id: &'a str,
	refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct HostedResponse {
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	scope: Option<String>,
}

/// Result of a successful exchange, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
	pub topology: Topology,
	pub authorization_endpoint: String,
	/// Local expiry time derived from `expires_in`; hosted only. Informational.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<DateTime<Local>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}

/// Exchanges credentials for a bearer token.
pub struct AuthResolver<'a> {
	http: &'a reqwest::Client,
}

impl<'a> AuthResolver<'a> {
	pub fn new(http: &'a reqwest::Client) -> Self {
		Self { http }
	}

	/// Selects the protocol, performs the exchange and updates `record`.
	///
	/// On success the token, topology and the authorization endpoint used are
	/// written to `record`. Nothing is written on failure.
	pub async fn authenticate(&self, record: &mut SessionRecord, request: &AuthRequest) -> Result<AuthOutcome> {
		let credentials = Credentials::select(request, record)?;
		let endpoint = present(&request.authorization_endpoint)
			.or(Some(record.authorization_endpoint.as_str()).filter(|e| !e.is_empty()))
			.ok_or(Error::MissingSetting("authorization endpoint (--endpoint)"))?
			.to_string();

		info!(target = "uipo.auth", topology = %credentials.topology(), %endpoint, "authenticating");
		let mut outcome = AuthOutcome {
			topology: credentials.topology(),
			authorization_endpoint: endpoint.clone(),
			expires_at: None,
			token_type: None,
			scope: None,
		};

		match credentials {
			Credentials::OnPremise {
				tenant_name,
				username,
				password,
			} => {
				record.access_token = self.exchange_on_premise(&endpoint, &tenant_name, &username, &password).await?;
				record.refresh_token.clear();
				record.tenant_name = tenant_name;
			}
			Credentials::Hosted {
				client_id,
				refresh_token,
			} => {
				let response = self.exchange_hosted(&endpoint, &client_id, &refresh_token).await?;
				record.access_token = response.access_token;
				record.refresh_token = refresh_token;
				record.client_id = client_id;
				outcome.expires_at = response.expires_in.and_then(expiry_from_now);
				outcome.token_type = response.token_type;
				outcome.scope = response.scope;
			}
		}

		record.topology = outcome.topology;
		record.authorization_endpoint = endpoint;
		info!(target = "uipo.auth", topology = %outcome.topology, "authentication successful");
		Ok(outcome)
	}

	async fn exchange_on_premise(&self, endpoint: &str, tenant_name: &str, username: &str, password: &str) -> Result<String> {
		let body = OnPremiseRequest {
			tenant_name,
			username,
			password,
		};
		let (status, bytes) = self.post(endpoint, &body).await?;

		let response: OnPremiseResponse = serde_json::from_slice(&bytes).unwrap_or_default();
		if status >= 300 || !response.success {
			return Err(Error::AuthRejected(rejection_text(&bytes, response.error.as_ref(), status)));
		}
		response
			.result
			.filter(|token| !token.is_empty())
			.ok_or_else(|| Error::AuthRejected("server reported success without a token".into()))
	}

	async fn exchange_hosted(&self, endpoint: &str, client_id: &str, refresh_token: &str) -> Result<HostedResponse> {
		let body = HostedRequest {
			grant_type: "refresh_token",
			client_id,
			refresh_token,
		};
		let (status, bytes) = self.post(endpoint, &body).await?;

		if status >= 300 {
			return Err(Error::AuthRejected(rejection_text(&bytes, None, status)));
		}
		serde_json::from_slice::<HostedResponse>(&bytes)
			.map_err(|e| Error::AuthRejected(format!("unexpected token response: {e}")))
	}

	/// Unauthenticated JSON POST. Network failures are [`Error::Transport`].
	async fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<(u16, Vec<u8>)> {
		let response = self.http.post(endpoint).json(body).send().await?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await?.to_vec();
		debug!(target = "uipo.auth", status, bytes = bytes.len(), "authorization response received");
		Ok((status, bytes))
	}
}

/// `None` when the server's lifetime falls outside the representable range.
fn expiry_from_now(expires_in: i64) -> Option<DateTime<Local>> {
	Local::now().checked_add_signed(TimeDelta::try_seconds(expires_in)?)
}

/// Extracts the most useful server-provided text from a rejection.
fn rejection_text(body: &[u8], error: Option<&serde_json::Value>, status: u16) -> String {
	let from_error = |value: &serde_json::Value| match value {
		serde_json::Value::String(text) => Some(text.clone()),
		serde_json::Value::Object(map) => ["message", "details"]
			.iter()
			.find_map(|key| map.get(*key).and_then(|v| v.as_str()).map(str::to_string)),
		_ => None,
	};

	if let Some(text) = error.and_then(from_error).filter(|t| !t.is_empty()) {
		return text;
	}

	if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice::<serde_json::Value>(body) {
		for key in ["error_description", "message", "error"] {
			if let Some(text) = map.get(key).and_then(from_error).filter(|t| !t.is_empty()) {
				return text;
			}
		}
	}

	format!("authorization server returned status {status}")
}
