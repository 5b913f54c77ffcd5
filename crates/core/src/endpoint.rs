//! Request URL construction for each deployment [`Topology`].

use crate::error::{Error, Result};
use crate::record::{SessionRecord, Topology};

/// Fixed path suffixes of the resource endpoints the CLI calls.
pub mod paths {
	pub const ROBOTS: &str = "/odata/Robots";
	pub const ALL_FOLDERS: &str = "/api/FoldersNavigation/GetAllFoldersForCurrentUser";
	pub const FILTERED_FOLDERS: &str = "/api/FoldersNavigation/GetFoldersForCurrentUser";
	pub const ADD_QUEUE_ITEM: &str = "/odata/Queues/UiPathODataSvc.AddQueueItem";
	pub const UPLOAD_PACKAGE: &str = "/odata/Processes/UiPath.Server.Configuration.OData.UploadPackage";
}

/// Builds the fully qualified URL for `path_suffix`.
///
/// Hosted URLs are `<api>/<tenant>/<service><suffix>`, on-premise URLs are
/// `<api><suffix>`. A trailing `/` on `api_endpoint` is ignored.
pub fn resolve(
	topology: Topology,
	api_endpoint: &str,
	tenant_alias: &str,
	service_alias: &str,
	path_suffix: &str,
) -> Result<String> {
	let base = api_endpoint.trim_end_matches('/');
	match topology {
		Topology::Hosted => Ok(format!("{base}/{tenant_alias}/{service_alias}{path_suffix}")),
		Topology::OnPremise => Ok(format!("{base}{path_suffix}")),
		Topology::Unknown => Err(Error::UnknownTopology),
	}
}

impl SessionRecord {
	/// Resolves `path_suffix` against the cached endpoint and aliases.
	pub fn resource_url(&self, path_suffix: &str) -> Result<String> {
		resolve(self.topology, &self.api_endpoint, &self.tenant_alias, &self.service_alias, path_suffix)
	}
}
