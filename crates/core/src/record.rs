//! The persisted session record: [`SessionRecord`], [`Topology`] and [`TargetFolder`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Schema version written to fresh records.
pub const SCHEMA_VERSION: u32 = 1;

/// Public client id used for hosted refresh-token exchanges unless overridden.
pub const DEFAULT_CLIENT_ID: &str = "5v7PmPJL6FOGu6RB8I1Y4adLBhIwovQN";

/// Deployment shape of the Orchestrator the session talks to.
///
/// Drives both URL construction and which authentication protocol applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Topology {
	/// Multi-tenant hosted service, addressed as `<api>/<tenant>/<service>`.
	Hosted,
	/// Self-hosted installation, addressed directly at the API root.
	OnPremise,
	/// No successful authentication yet. Also absorbs unrecognised values.
	#[default]
	#[serde(other)]
	Unknown,
}

impl fmt::Display for Topology {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Topology::Hosted => write!(f, "Hosted"),
			Topology::OnPremise => write!(f, "OnPremise"),
			Topology::Unknown => write!(f, "Unknown"),
		}
	}
}

/// Default execution folder (organization unit) for resource calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFolder {
	#[serde(default)]
	pub id: i64,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub fully_qualified_name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub parent_id: i64,
}

/// Durable session state shared across invocations.
///
/// Field declaration order is the on-disk order. String fields use the empty
/// string for "not set" so a record round-trips field for field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
	pub schema_version: u32,
	pub access_token: String,
	pub api_protocol_version: String,
	pub authorization_endpoint: String,
	pub api_endpoint: String,
	pub topology: Topology,
	pub tenant_alias: String,
	pub service_alias: String,
	/// On-premise tenancy name, sent as the tenant header for that topology.
	pub tenant_name: String,
	pub refresh_token: String,
	pub client_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target_folder: Option<TargetFolder>,
}

impl Default for SessionRecord {
	fn default() -> Self {
		Self::new()
	}
}

impl SessionRecord {
	/// Creates an unauthenticated record with current [`SCHEMA_VERSION`] and
	/// the [`DEFAULT_CLIENT_ID`].
	pub fn new() -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			access_token: String::new(),
			api_protocol_version: String::new(),
			authorization_endpoint: String::new(),
			api_endpoint: String::new(),
			topology: Topology::Unknown,
			tenant_alias: String::new(),
			service_alias: String::new(),
			tenant_name: String::new(),
			refresh_token: String::new(),
			client_id: DEFAULT_CLIENT_ID.to_string(),
			target_folder: None,
		}
	}

	/// Returns the cached topology, failing fast when it is [`Topology::Unknown`].
	pub fn require_topology(&self) -> Result<Topology> {
		match self.topology {
			Topology::Unknown => Err(Error::UnknownTopology),
			known => Ok(known),
		}
	}

	/// Checks everything a non-authentication request needs, in order:
	/// known topology, hosted aliases, API endpoint, bearer token.
	pub fn ensure_request_ready(&self) -> Result<()> {
		if self.require_topology()? == Topology::Hosted {
			if self.tenant_alias.is_empty() {
				return Err(Error::MissingSetting("tenant alias (--alname)"));
			}
			if self.service_alias.is_empty() {
				return Err(Error::MissingSetting("service alias (--slname)"));
			}
		}
		if self.api_endpoint.is_empty() {
			return Err(Error::MissingSetting("API endpoint (--api-endpoint)"));
		}
		if self.access_token.is_empty() {
			return Err(Error::MissingSetting("access token; run `uipo authenticate`"));
		}
		Ok(())
	}

	/// Value of the tenant header for the cached topology.
	pub fn tenant_header(&self) -> &str {
		match self.topology {
			Topology::OnPremise if !self.tenant_name.is_empty() => &self.tenant_name,
			_ => &self.service_alias,
		}
	}

	/// Organization unit id for folder-scoped calls, if a target folder is set.
	pub fn organization_unit_id(&self) -> Option<i64> {
		self.target_folder.as_ref().map(|folder| folder.id)
	}

	/// Records the protocol version a server advertised. Empty values are ignored.
	pub fn note_api_version(&mut self, version: Option<&str>) {
		if let Some(version) = version.filter(|v| !v.is_empty()) {
			self.api_protocol_version = version.to_string();
		}
	}
}

/// Overwrites `slot` with `value` when a value was explicitly supplied.
///
/// Returns true when the stored value changed.
pub fn overwrite(slot: &mut String, value: Option<&str>) -> bool {
	match value {
		Some(value) if slot != value => {
			*slot = value.to_string();
			true
		}
		_ => false,
	}
}
