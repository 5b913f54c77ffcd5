//! Authenticated request execution and uniform response classification.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::overrides::RuntimeOverrides;
use crate::record::SessionRecord;

/// Header carrying the tenant (service alias, or tenancy name on-premise).
pub const TENANT_HEADER: &str = "x-uipath-tenantname";
/// Header carrying the folder / organization unit id.
pub const ORGANIZATION_UNIT_HEADER: &str = "x-uipath-organizationunitid";
/// Response header advertising supported API versions.
pub const API_VERSION_HEADER: &str = "api-supported-versions";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds the HTTP client shared by authentication and resource calls.
///
/// Applies the explicit HTTPS proxy and the `--unsafe` certificate bypass.
pub fn build_http_client(overrides: &RuntimeOverrides) -> Result<reqwest::Client> {
	let mut builder = reqwest::Client::builder()
		.user_agent(concat!("uipo/", env!("CARGO_PKG_VERSION")))
		.timeout(REQUEST_TIMEOUT);

	if let Some(proxy) = &overrides.https_proxy {
		let proxy = reqwest::Proxy::https(proxy).map_err(|e| Error::Transport(format!("invalid HTTPS proxy {proxy}: {e}")))?;
		builder = builder.proxy(proxy);
	}
	if overrides.insecure {
		debug!(target = "uipo.http", "certificate verification disabled");
		builder = builder.danger_accept_invalid_certs(true);
	}

	builder
		.build()
		.map_err(|e| Error::Transport(format!("failed to create HTTP client: {e}")))
}

/// Body of an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
	#[default]
	Empty,
	Json(serde_json::Value),
	Multipart(reqwest::multipart::Form),
}

/// Successful (status < 300) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
	pub body: Vec<u8>,
	/// Value of the `api-supported-versions` header, when present.
	pub api_version: Option<String>,
}

impl ApiResponse {
	/// Decodes the body against a command-specific response shape.
	pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
		Ok(serde_json::from_slice(&self.body)?)
	}
}

/// Error body shape returned by the Orchestrator API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
	message: String,
	#[serde(default)]
	error_code: Option<i64>,
}

/// Issues requests on behalf of a validated session.
///
/// Every request carries the tenant header and the bearer token from the
/// record. No request is retried.
pub struct SessionClient<'a> {
	http: &'a reqwest::Client,
	record: &'a SessionRecord,
}

impl<'a> SessionClient<'a> {
	/// Validates `record` for request use (known topology, hosted aliases,
	/// endpoint, token) before any network call can be made.
	pub fn new(http: &'a reqwest::Client, record: &'a SessionRecord) -> Result<Self> {
		record.ensure_request_ready()?;
		Ok(Self { http, record })
	}

	/// Resolves a resource URL for the session's topology.
	pub fn url(&self, path_suffix: &str) -> Result<String> {
		self.record.resource_url(path_suffix)
	}

	/// Organization unit header for the target folder, if one is set.
	pub fn folder_header(&self) -> Option<(HeaderName, String)> {
		self.record
			.organization_unit_id()
			.map(|id| (HeaderName::from_static(ORGANIZATION_UNIT_HEADER), id.to_string()))
	}

	pub async fn get(&self, url: &str, query: &[(&str, String)], extra_headers: &[(HeaderName, String)]) -> Result<ApiResponse> {
		let request = self.http.get(url).query(query);
		self.send(request, Method::GET, url, RequestBody::Empty, extra_headers).await
	}

	/// Executes one request and classifies the response.
	pub async fn execute(&self, method: Method, url: &str, body: RequestBody, extra_headers: &[(HeaderName, String)]) -> Result<ApiResponse> {
		let request = self.http.request(method.clone(), url);
		self.send(request, method, url, body, extra_headers).await
	}

	async fn send(
		&self,
		request: reqwest::RequestBuilder,
		method: Method,
		url: &str,
		body: RequestBody,
		extra_headers: &[(HeaderName, String)],
	) -> Result<ApiResponse> {
		let mut request = request.headers(self.session_headers(extra_headers)?);
		request = match body {
			RequestBody::Empty => request,
			RequestBody::Json(value) => request.json(&value),
			RequestBody::Multipart(form) => request.multipart(form),
		};

		info!(target = "uipo.http", %method, %url, "sending request");
		let response = request.send().await?;
		let status = response.status();
		let api_version = response
			.headers()
			.get(API_VERSION_HEADER)
			.and_then(|v| v.to_str().ok())
			.map(str::to_string);
		let body = response.bytes().await?.to_vec();
		debug!(target = "uipo.http", status = status.as_u16(), bytes = body.len(), "response received");

		classify(status, &body)?;
		Ok(ApiResponse { body, api_version })
	}

	fn session_headers(&self, extra_headers: &[(HeaderName, String)]) -> Result<HeaderMap> {
		let mut headers = HeaderMap::new();
		headers.insert(HeaderName::from_static(TENANT_HEADER), header_value(self.record.tenant_header())?);
		headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", self.record.access_token))?);
		for (name, value) in extra_headers {
			headers.insert(name.clone(), header_value(value)?);
		}
		Ok(headers)
	}
}

fn header_value(value: &str) -> Result<HeaderValue> {
	HeaderValue::from_str(value).map_err(|e| Error::Transport(format!("invalid header value: {e}")))
}

/// Maps a response status and body to success or a typed failure.
///
/// Below 300 is success regardless of body shape. Otherwise a
/// `{message, errorCode}` body becomes [`Error::Api`]; anything else becomes
/// [`Error::Transport`] carrying the status line.
pub fn classify(status: StatusCode, body: &[u8]) -> Result<()> {
	if status.as_u16() < 300 {
		return Ok(());
	}

	match serde_json::from_slice::<ErrorBody>(body) {
		Ok(err) => Err(Error::Api {
			status: status.as_u16(),
			code: err.error_code,
			message: err.message,
		}),
		Err(_) => Err(Error::Transport(format!(
			"HTTP {} {}",
			status.as_u16(),
			status.canonical_reason().unwrap_or("")
		)
		.trim_end()
		.to_string())),
	}
}
