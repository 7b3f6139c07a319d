use persist::config::PersistConfig;
use persist::persist::{staging_path, Checksum};
use persist::{hash_bytes, Metadata, PersistError, Persister};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct HostDb {
    hosts: BTreeMap<String, u64>,
    last_scan: Option<String>,
}

fn sample_db() -> HostDb {
    let mut hosts = BTreeMap::new();
    hosts.insert("alpha".to_string(), 10);
    hosts.insert("beta".to_string(), 20);
    HostDb {
        hosts,
        last_scan: Some("2026-10-19".to_string()),
    }
}

#[test]
fn save_load_and_reject_incompatible_version() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cfg.json");
    let persister = Persister::default();
    let meta = Metadata::new("cfg", "1");

    persister
        .save_json(&meta, &serde_json::json!({ "x": 1 }), &path)
        .unwrap();

    let loaded: serde_json::Value = persister.load_json(&meta, &path).unwrap();
    assert_eq!(loaded, serde_json::json!({ "x": 1 }));

    let err = persister
        .load_json::<serde_json::Value>(&Metadata::new("cfg", "2"), &path)
        .unwrap_err();
    assert!(matches!(err, PersistError::BadVersion));
}

#[test]
fn resave_replaces_contents_atomically() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("hosts").join("hostdb.json");
    let persister = Persister::default();
    let meta = Metadata::new("Host DB", "1.2.0");

    let mut db = sample_db();
    persister.save_json(&meta, &db, &path).unwrap();
    db.hosts.insert("gamma".to_string(), 30);
    db.last_scan = None;
    persister.save_json(&meta, &db, &path).unwrap();

    let loaded: HostDb = persister.load_json(&meta, &path).unwrap();
    assert_eq!(loaded, db);
    assert!(!staging_path(&path).exists());
}

#[test]
fn read_metadata_exposes_stored_checksum() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("hostdb.json");
    let persister = Persister::default();
    let meta = Metadata::new("Host DB", "1.2.0");
    persister.save_json(&meta, &sample_db(), &path).unwrap();

    let (stored, checksum) = persister.read_metadata(&path).unwrap();
    assert_eq!(stored, meta);

    let payload = serde_json::to_vec_pretty(&sample_db()).unwrap();
    assert_eq!(checksum, Checksum::Hash(hash_bytes(&payload)));
}

#[test]
fn foreign_file_reports_bad_header() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wallet.json");
    let persister = Persister::default();
    persister
        .save_bytes(&Metadata::new("wallet", "1"), b"{}", &path)
        .unwrap();

    let err = persister
        .load_bytes(&Metadata::new("Host DB", "1"), &path)
        .unwrap_err();
    assert!(matches!(err, PersistError::BadHeader));
}

#[test]
fn payload_decode_failure_surfaces_serialization_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("text.bin");
    let persister = Persister::default();
    let meta = Metadata::new("notes", "1");
    persister.save_bytes(&meta, b"not json at all", &path).unwrap();

    let err = persister.load_json::<HostDb>(&meta, &path).unwrap_err();
    assert!(matches!(err, PersistError::Serialization(_)));
    assert_eq!(persister.registry().active_count(), 0);
}

#[test]
fn stale_staging_survives_when_cleanup_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("state.bin");
    let staged = staging_path(&path);
    fs::write(&staged, b"orphan").unwrap();

    let persister = Persister::new(PersistConfig {
        clean_stale_staging: false,
        sync_parent_dir: false,
        ..PersistConfig::default()
    });
    let meta = Metadata::new("state", "1");
    persister.save_bytes(&meta, b"fresh", &path).unwrap();

    // The save itself truncates and consumes the staging path
    assert!(!staged.exists());
    assert_eq!(persister.load_bytes(&meta, &path).unwrap(), b"fresh");
}

#[cfg(unix)]
#[test]
fn saved_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("private").join("keys.json");
    Persister::default()
        .save_bytes(&Metadata::new("keys", "1"), b"[]", &path)
        .unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode & 0o077, 0);
}
