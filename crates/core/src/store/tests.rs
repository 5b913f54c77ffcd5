use std::future::pending;

use tempfile::TempDir;

use super::*;
use crate::record::{DEFAULT_CLIENT_ID, TargetFolder, Topology};

fn store_in(tmp: &TempDir) -> ConfigStore {
	ConfigStore::at(tmp.path().join(".uipo"))
}

fn populated_record() -> SessionRecord {
	SessionRecord {
		schema_version: 1,
		access_token: "bearer-abc".into(),
		api_protocol_version: "17.0".into(),
		authorization_endpoint: "https://account.example.com/oauth/token".into(),
		api_endpoint: "https://cloud.example.com".into(),
		topology: Topology::Hosted,
		tenant_alias: "acct".into(),
		service_alias: "svc".into(),
		tenant_name: String::new(),
		refresh_token: "refresh-xyz".into(),
		client_id: "custom-client".into(),
		target_folder: Some(TargetFolder {
			id: 42,
			name: "Finance".into(),
			fully_qualified_name: "Shared/Finance".into(),
			description: String::new(),
			parent_id: 7,
		}),
	}
}

async fn persist(store: &ConfigStore, record: &SessionRecord) {
	store.persist_until(record, pending()).await.unwrap();
}

#[test]
fn fresh_environment_loads_defaults() {
	let tmp = TempDir::new().unwrap();
	let record = store_in(&tmp).load().unwrap();

	assert_eq!(record.schema_version, 1);
	assert!(record.access_token.is_empty());
	assert_eq!(record.topology, Topology::Unknown);
	assert_eq!(record.client_id, DEFAULT_CLIENT_ID);
}

#[test]
fn empty_file_loads_defaults() {
	let tmp = TempDir::new().unwrap();
	let store = store_in(&tmp);
	std::fs::create_dir_all(store.dir()).unwrap();
	std::fs::write(store.path(), "").unwrap();

	assert_eq!(store.load().unwrap(), SessionRecord::new());
}

#[test]
fn malformed_file_is_corrupt() {
	let tmp = TempDir::new().unwrap();
	let store = store_in(&tmp);
	std::fs::create_dir_all(store.dir()).unwrap();
	std::fs::write(store.path(), "{\"accessToken\": ").unwrap();

	match store.load() {
		Err(Error::ConfigCorrupt { path, .. }) => assert_eq!(path, store.path()),
		other => panic!("expected ConfigCorrupt, got {other:?}"),
	}
}

#[tokio::test]
async fn persist_then_load_round_trips() {
	let tmp = TempDir::new().unwrap();
	let store = store_in(&tmp);

	let populated = populated_record();
	persist(&store, &populated).await;
	assert_eq!(store.load().unwrap(), populated);

	let empty = SessionRecord {
		client_id: String::new(),
		schema_version: 0,
		..SessionRecord::new()
	};
	persist(&store, &empty).await;
	assert_eq!(store.load().unwrap(), empty);
}

#[tokio::test]
async fn persist_is_byte_identical_for_same_record() {
	let tmp = TempDir::new().unwrap();
	let store = store_in(&tmp);
	let record = populated_record();

	persist(&store, &record).await;
	let first = std::fs::read(store.path()).unwrap();
	persist(&store, &record).await;
	let second = std::fs::read(store.path()).unwrap();

	assert_eq!(first, second);
}

#[tokio::test]
async fn persisted_fields_keep_declaration_order() {
	let tmp = TempDir::new().unwrap();
	let store = store_in(&tmp);
	persist(&store, &populated_record()).await;

	let text = std::fs::read_to_string(store.path()).unwrap();
	let schema = text.find("\"schemaVersion\"").unwrap();
	let token = text.find("\"accessToken\"").unwrap();
	let topology = text.find("\"topology\"").unwrap();
	let folder = text.find("\"targetFolder\"").unwrap();
	assert!(schema < token && token < topology && topology < folder);
	assert!(text.ends_with('\n'));
}

#[tokio::test]
async fn persist_fails_when_directory_cannot_be_created() {
	let tmp = TempDir::new().unwrap();
	let blocker = tmp.path().join("not-a-dir");
	std::fs::write(&blocker, "file").unwrap();
	let store = ConfigStore::at(blocker.join(".uipo"));

	let err = store.persist(&SessionRecord::new()).await.unwrap_err();
	assert!(matches!(err, Error::PersistFailed { .. }), "got {err:?}");
}

#[test]
fn load_removes_stale_temp_files() {
	let tmp = TempDir::new().unwrap();
	let store = store_in(&tmp);
	std::fs::create_dir_all(store.dir()).unwrap();
	let stale = store.dir().join("temp-config12345");
	let unrelated = store.dir().join("notes.txt");
	std::fs::write(&stale, "{\"accessTok").unwrap();
	std::fs::write(&unrelated, "keep").unwrap();

	store.load().unwrap();

	assert!(!stale.exists());
	assert!(unrelated.exists());
}

#[tokio::test]
async fn interrupted_persist_keeps_previous_record() {
	let tmp = TempDir::new().unwrap();
	let store = store_in(&tmp);
	let previous = populated_record();
	persist(&store, &previous).await;

	let next = SessionRecord {
		access_token: "replacement".into(),
		..previous.clone()
	};
	let result = store.persist_until(&next, async { Interrupt::Terminate }).await;

	assert!(matches!(result, Err(WriteError::Interrupted(Interrupt::Terminate))));
	assert_eq!(store.load().unwrap(), previous);
}

#[test]
fn resolve_honours_home_override() {
	let tmp = TempDir::new().unwrap();
	let overrides = RuntimeOverrides {
		home: Some(tmp.path().to_path_buf()),
		..Default::default()
	};
	let store = ConfigStore::resolve(&overrides).unwrap();
	assert_eq!(store.path(), tmp.path().join(".uipo").join("config.json"));
}
