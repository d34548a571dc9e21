//! Shared integration-test server bootstrap helpers.

#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use pastebox_server::{create_app, AppState, BlobStore, Config, Database};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub(crate) const AUTH_HEADER: &str = "x-remote-user";

pub(crate) fn test_config_for_dir(dir: &Path) -> Config {
    Config {
        port: 0,
        db_path: dir.join("db").to_string_lossy().to_string(),
        attachments_path: dir.join("attachments").to_string_lossy().to_string(),
        max_paste_size: 64 * 1024,
        auth_header: AUTH_HEADER.to_string(),
        admin_users: vec!["root".to_string()],
    }
}

pub(crate) struct TestApp {
    pub server: TestServer,
    pub attachments_dir: PathBuf,
    _temp: TempDir,
}

pub(crate) fn setup_test_server() -> TestApp {
    let temp = TempDir::new().expect("temp dir");
    let config = test_config_for_dir(temp.path());
    let db = Database::new(&config.db_path).expect("open db");
    let blobs = BlobStore::open(&config.attachments_path).expect("open blob store");
    let attachments_dir = blobs.root().to_path_buf();
    let state = AppState::new(config, db, blobs);
    let server = TestServer::new(create_app(state, false)).expect("server");
    TestApp {
        server,
        attachments_dir,
        _temp: temp,
    }
}

/// Attach the proxy identity header for `user`.
pub(crate) fn as_user(request: TestRequest, user: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static(AUTH_HEADER),
        HeaderValue::from_str(user).expect("username header"),
    )
}

/// Number of committed blob files on disk.
pub(crate) fn blob_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("read attachments dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("bin"))
        .count()
}
