//! Authentication exchanges against a mock authorization server.

use httpmock::prelude::*;
use serde_json::json;
use uipo::{AuthRequest, AuthResolver, Error, SessionRecord, Topology};

fn hosted_request(endpoint: String) -> AuthRequest {
	AuthRequest {
		authorization_endpoint: Some(endpoint),
		refresh_token: Some("refresh-1".into()),
		..Default::default()
	}
}

fn on_premise_request(endpoint: String) -> AuthRequest {
	AuthRequest {
		authorization_endpoint: Some(endpoint),
		tenant: Some("Default".into()),
		user_id: Some("admin".into()),
		password: Some("pw".into()),
		refresh_token: Some("ignored".into()),
		..Default::default()
	}
}

#[tokio::test]
async fn hosted_exchange_caches_token_and_endpoint() {
	let server = MockServer::start_async().await;
	let token = server.mock_async(|when, then| {
		when.method(POST).path("/oauth/token").json_body(json!({
			"grant_type": "refresh_token",
			"client_id": uipo::DEFAULT_CLIENT_ID,
			"refresh_token": "refresh-1"
		}));
		then.status(200).json_body(json!({
			"access_token": "bearer-hosted",
			"id_token": "id",
			"scope": "OR.Robots",
			"expires_in": 86400,
			"token_type": "Bearer"
		}));
	}).await;

	let http = reqwest::Client::new();
	let mut record = SessionRecord::new();
	let outcome = AuthResolver::new(&http)
		.authenticate(&mut record, &hosted_request(server.url("/oauth/token")))
		.await
		.unwrap();

	token.assert_async().await;
	assert_eq!(outcome.topology, Topology::Hosted);
	assert!(outcome.expires_at.is_some());
	assert_eq!(outcome.token_type.as_deref(), Some("Bearer"));
	assert_eq!(record.access_token, "bearer-hosted");
	assert_eq!(record.topology, Topology::Hosted);
	assert_eq!(record.refresh_token, "refresh-1");
	assert_eq!(record.authorization_endpoint, server.url("/oauth/token"));
}

#[tokio::test]
async fn hosted_exchange_tolerates_out_of_range_lifetime() {
	let server = MockServer::start_async().await;
	server.mock_async(|when, then| {
		when.method(POST).path("/oauth/token");
		then.status(200).json_body(json!({ "access_token": "long-lived", "expires_in": 10_000_000_000_000_i64 }));
	}).await;

	let http = reqwest::Client::new();
	let mut record = SessionRecord::new();
	let outcome = AuthResolver::new(&http)
		.authenticate(&mut record, &hosted_request(server.url("/oauth/token")))
		.await
		.unwrap();

	assert_eq!(outcome.expires_at, None);
	assert_eq!(record.access_token, "long-lived");
	assert_eq!(record.topology, Topology::Hosted);
}

#[tokio::test]
async fn cached_endpoint_and_refresh_token_are_reused() {
	let server = MockServer::start_async().await;
	let token = server.mock_async(|when, then| {
		when.method(POST).path("/oauth/token").json_body_includes(r#"{"refresh_token":"cached"}"#);
		then.status(200).json_body(json!({ "access_token": "again", "expires_in": 60 }));
	}).await;

	let http = reqwest::Client::new();
	let mut record = SessionRecord {
		authorization_endpoint: server.url("/oauth/token"),
		refresh_token: "cached".into(),
		..SessionRecord::new()
	};
	AuthResolver::new(&http)
		.authenticate(&mut record, &AuthRequest::default())
		.await
		.unwrap();

	token.assert_async().await;
	assert_eq!(record.access_token, "again");
}

#[tokio::test]
async fn on_premise_exchange_clears_refresh_token() {
	let server = MockServer::start_async().await;
	let token = server.mock_async(|when, then| {
		when.method(POST).path("/api/Account/Authenticate").json_body(json!({
			"tenancyName": "Default",
			"usernameOrEmailAddress": "admin",
			"password": "pw"
		}));
		then.status(200).json_body(json!({
			"result": "bearer-onprem",
			"targetUrl": null,
			"success": true,
			"error": null,
			"unAuthorizedRequest": false,
			"__abp": true
		}));
	}).await;

	let http = reqwest::Client::new();
	let mut record = SessionRecord {
		refresh_token: "stale".into(),
		..SessionRecord::new()
	};
	let outcome = AuthResolver::new(&http)
		.authenticate(&mut record, &on_premise_request(server.url("/api/Account/Authenticate")))
		.await
		.unwrap();

	token.assert_async().await;
	assert_eq!(outcome.topology, Topology::OnPremise);
	assert_eq!(outcome.expires_at, None);
	assert_eq!(record.access_token, "bearer-onprem");
	assert_eq!(record.topology, Topology::OnPremise);
	assert_eq!(record.tenant_name, "Default");
	assert!(record.refresh_token.is_empty());
}

#[tokio::test]
async fn on_premise_failure_flag_is_rejected() {
	let server = MockServer::start_async().await;
	server.mock_async(|when, then| {
		when.method(POST).path("/api/Account/Authenticate");
		then.status(200).json_body(json!({
			"result": "should-not-be-trusted",
			"success": false,
			"error": { "code": 0, "message": "Invalid user name or password", "details": null }
		}));
	}).await;

	let http = reqwest::Client::new();
	let mut record = SessionRecord::new();
	let err = AuthResolver::new(&http)
		.authenticate(&mut record, &on_premise_request(server.url("/api/Account/Authenticate")))
		.await
		.unwrap_err();

	match err {
		Error::AuthRejected(text) => assert_eq!(text, "Invalid user name or password"),
		other => panic!("expected AuthRejected, got {other:?}"),
	}
	assert!(record.access_token.is_empty());
	assert_eq!(record.topology, Topology::Unknown);
	assert!(record.authorization_endpoint.is_empty());
}

#[tokio::test]
async fn hosted_error_status_is_rejected_with_server_text() {
	let server = MockServer::start_async().await;
	server.mock_async(|when, then| {
		when.method(POST).path("/oauth/token");
		then.status(400).json_body(json!({
			"error": "invalid_grant",
			"error_description": "refresh token expired"
		}));
	}).await;

	let http = reqwest::Client::new();
	let mut record = SessionRecord::new();
	let err = AuthResolver::new(&http)
		.authenticate(&mut record, &hosted_request(server.url("/oauth/token")))
		.await
		.unwrap_err();

	assert!(matches!(err, Error::AuthRejected(ref text) if text == "refresh token expired"), "got {err:?}");
}

#[tokio::test]
async fn invalid_on_premise_credentials_never_reach_the_network() {
	let server = MockServer::start_async().await;
	let any = server.mock_async(|when, then| {
		when.path("/auth");
		then.status(200);
	}).await;

	let request = AuthRequest {
		authorization_endpoint: Some(server.url("/auth")),
		user_id: Some("u".into()),
		refresh_token: Some("r".into()),
		password: Some(String::new()),
		tenant: Some(String::new()),
		..Default::default()
	};
	let http = reqwest::Client::new();
	let err = AuthResolver::new(&http)
		.authenticate(&mut SessionRecord::new(), &request)
		.await
		.unwrap_err();

	assert!(matches!(err, Error::InvalidCredentials));
	any.assert_calls_async(0).await;
}

#[tokio::test]
async fn missing_endpoint_is_reported() {
	let http = reqwest::Client::new();
	let request = AuthRequest {
		refresh_token: Some("r".into()),
		..Default::default()
	};
	let err = AuthResolver::new(&http)
		.authenticate(&mut SessionRecord::new(), &request)
		.await
		.unwrap_err();

	assert!(matches!(err, Error::MissingSetting(_)));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
	let http = reqwest::Client::new();
	let request = hosted_request("http://127.0.0.1:9/oauth/token".into());
	let err = AuthResolver::new(&http)
		.authenticate(&mut SessionRecord::new(), &request)
		.await
		.unwrap_err();

	assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}
