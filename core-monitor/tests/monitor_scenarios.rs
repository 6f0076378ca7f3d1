//! End-to-end monitor scenarios
//!
//! These tests run the poller and auditor against the real Google Drive
//! connector, backed by an in-memory HTTP fake that answers the Drive v3
//! endpoints. They cover:
//! - Window bound and query string for a fixed clock
//! - Revocation of an `anyone` permission by exact ID
//! - Empty listings that must not touch permissions
//! - Listing failures that leave the cycle intact
//! - Default sharing audit
//! - The human-readable log lines a cycle emits

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    AccessTokenSource, DriveClient, FixedClock, HttpClient, HttpMethod, HttpRequest, HttpResponse,
};
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use core_monitor::{report_default_sharing, Poller, SharingAudit, Verdict};
use core_runtime::MonitorConfig;
use provider_google_drive::GoogleDriveConnector;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

const API: &str = "https://www.googleapis.com/drive/v3";

// ============================================================================
// Fake Drive API
// ============================================================================

#[derive(Default)]
struct FakeDriveApi {
    /// `None` makes `files.list` answer 500
    listing: Option<Value>,
    files: HashMap<String, Value>,
    about: Option<Value>,
    root_permissions: Option<Value>,
    requests: Mutex<Vec<(HttpMethod, String)>>,
}

impl FakeDriveApi {
    fn listing(mut self, files: Value) -> Self {
        self.listing = Some(json!({ "files": files }));
        self
    }

    fn file(mut self, id: &str, body: Value) -> Self {
        self.files.insert(id.to_string(), body);
        self
    }

    fn requests(&self) -> Vec<(HttpMethod, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn deletes(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|(method, _)| *method == HttpMethod::Delete)
            .map(|(_, url)| url)
            .collect()
    }

    fn permission_fetches(&self) -> usize {
        self.requests()
            .iter()
            .filter(|(method, url)| {
                *method == HttpMethod::Get && url.contains("?fields=permissions(")
            })
            .count()
    }

    fn route(&self, method: HttpMethod, url: &str) -> (u16, Value) {
        let path = url.strip_prefix(API).unwrap_or(url);

        if method == HttpMethod::Delete {
            return (204, Value::Null);
        }
        if path.starts_with("/files?") {
            return match &self.listing {
                Some(body) => (200, body.clone()),
                None => (500, json!({ "error": { "code": 500, "message": "Backend Error" } })),
            };
        }
        if path.starts_with("/about") {
            return self.about.clone().map_or((500, Value::Null), |b| (200, b));
        }
        if path.starts_with("/files/root/permissions") {
            return self
                .root_permissions
                .clone()
                .map_or((500, Value::Null), |b| (200, b));
        }

        let file_id = path
            .trim_start_matches("/files/")
            .split('?')
            .next()
            .unwrap_or_default();
        match self.files.get(file_id) {
            Some(body) => (200, body.clone()),
            None => (404, json!({ "error": { "code": 404, "message": "File not found" } })),
        }
    }
}

#[async_trait]
impl HttpClient for FakeDriveApi {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let url = urlencoding::decode(&request.url)
            .map_err(|e| BridgeError::OperationFailed(e.to_string()))?
            .into_owned();
        self.requests
            .lock()
            .unwrap()
            .push((request.method, url.clone()));

        let (status, body) = self.route(request.method, &url);
        let body = if body.is_null() {
            Bytes::new()
        } else {
            Bytes::from(body.to_string())
        };

        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body,
        })
    }
}

struct StaticToken;

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> BridgeResult<String> {
        Ok("ya29.test".to_string())
    }
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn connector(api: &Arc<FakeDriveApi>) -> Arc<dyn DriveClient> {
    Arc::new(GoogleDriveConnector::new(api.clone(), Arc::new(StaticToken)))
}

fn poller(api: &Arc<FakeDriveApi>, config: &MonitorConfig) -> Poller {
    let now = Utc.with_ymd_and_hms(2023, 2, 16, 10, 0, 0).unwrap();
    Poller::new(connector(api), Arc::new(FixedClock(now)), config)
}

fn public_file(id: &str, name: &str, permission_id: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "webViewLink": format!("https://drive.google.com/file/d/{}/view", id),
        "permissions": [
            { "kind": "drive#permission", "id": permission_id, "type": "anyone", "role": "reader" },
            { "kind": "drive#permission", "id": "06ab", "type": "user", "role": "owner",
              "emailAddress": "owner@example.com" }
        ]
    })
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_public_file_in_window_is_made_private() {
    let api = Arc::new(
        FakeDriveApi::default()
            .listing(json!([{ "id": "f1", "name": "report.pdf" }]))
            .file("f1", public_file("f1", "report.pdf", "p1")),
    );

    let report = poller(&api, &MonitorConfig::default()).run_cycle().await;

    assert_eq!(report.window.rfc3339(), "2023-02-16T07:59:00Z");
    let requests = api.requests();
    assert!(requests[0]
        .1
        .contains("q=createdTime > '2023-02-16T07:59:00Z'"));
    assert!(requests[0].1.contains("fields=nextPageToken,files(id,name)"));

    assert_eq!(report.files.len(), 1);
    assert!(report.files[0].made_private());
    assert_eq!(api.deletes(), vec![format!("{}/files/f1/permissions/p1", API)]);
}

#[tokio::test]
async fn test_cycle_logs_detection_and_remediation() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let api = Arc::new(
        FakeDriveApi::default()
            .listing(json!([{ "id": "f1", "name": "a.txt" }]))
            .file("f1", public_file("f1", "a.txt", "p1")),
    );

    poller(&api, &MonitorConfig::default()).run_cycle().await;

    let output = logs.contents();
    assert!(output.contains("New file detected: a.txt"), "{}", output);
    assert!(output.contains("Filename: a.txt (f1) permissions is anyone"), "{}", output);
    assert!(output.contains("Filename: a.txt (f1) permissions changed to private."), "{}", output);
}

#[tokio::test]
async fn test_empty_listing_makes_no_permission_calls() {
    let api = Arc::new(FakeDriveApi::default().listing(json!([])));

    let report = poller(&api, &MonitorConfig::default()).run_cycle().await;

    assert!(report.is_idle());
    assert!(report.query_error.is_none());
    assert_eq!(api.requests().len(), 1);
    assert_eq!(api.permission_fetches(), 0);
}

#[tokio::test]
async fn test_listing_failure_completes_cycle() {
    let api = Arc::new(FakeDriveApi::default());

    let report = poller(&api, &MonitorConfig::default()).run_cycle().await;

    assert!(report.is_idle());
    assert!(report.query_error.is_some());
    assert_eq!(api.requests().len(), 1);
}

#[tokio::test]
async fn test_private_and_unpermitted_files_are_left_alone() {
    let api = Arc::new(
        FakeDriveApi::default()
            .listing(json!([
                { "id": "f1", "name": "notes.txt" },
                { "id": "f2", "name": "empty.txt" }
            ]))
            .file(
                "f1",
                json!({
                    "id": "f1",
                    "name": "notes.txt",
                    "permissions": [
                        { "id": "06ab", "type": "user", "role": "owner" },
                        { "id": "d1", "type": "domain", "role": "reader" }
                    ]
                }),
            )
            .file("f2", json!({ "id": "f2", "name": "empty.txt", "permissions": [] })),
    );

    let report = poller(&api, &MonitorConfig::default()).run_cycle().await;

    assert_eq!(report.files[0].verdict, Verdict::Private);
    assert!(matches!(report.files[1].verdict, Verdict::Skipped(_)));
    assert!(api.deletes().is_empty());
}

#[tokio::test]
async fn test_each_file_finished_before_next_fetch() {
    let api = Arc::new(
        FakeDriveApi::default()
            .listing(json!([
                { "id": "f1", "name": "a.txt" },
                { "id": "f2", "name": "b.txt" }
            ]))
            .file("f1", public_file("f1", "a.txt", "p1"))
            .file("f2", public_file("f2", "b.txt", "p2")),
    );

    poller(&api, &MonitorConfig::default()).run_cycle().await;

    let sequence: Vec<_> = api.requests().into_iter().skip(1).map(|(_, url)| url).collect();
    assert!(sequence[0].starts_with(&format!("{}/files/f1?", API)));
    assert_eq!(sequence[1], format!("{}/files/f1/permissions/p1", API));
    assert!(sequence[2].starts_with(&format!("{}/files/f2?", API)));
    assert_eq!(sequence[3], format!("{}/files/f2/permissions/p2", API));
}

#[tokio::test]
async fn test_folder_restriction_reaches_query() {
    let config = MonitorConfig::builder()
        .folder_id("0BFolder")
        .build()
        .unwrap();
    let api = Arc::new(FakeDriveApi::default().listing(json!([])));

    poller(&api, &config).run_cycle().await;

    assert!(api.requests()[0]
        .1
        .contains("q='0BFolder' in parents and createdTime > '2023-02-16T07:59:00Z'"));
}

#[tokio::test]
async fn test_default_sharing_audit() {
    let api = Arc::new(FakeDriveApi {
        about: Some(json!({
            "user": {
                "permissionId": "06ab",
                "displayName": "Owner",
                "emailAddress": "owner@example.com"
            }
        })),
        root_permissions: Some(json!({
            "permissions": [
                { "id": "06ab", "type": "user", "role": "owner", "emailAddress": "owner@example.com" }
            ]
        })),
        ..Default::default()
    });

    let audit = report_default_sharing(connector(&api).as_ref()).await;

    assert!(matches!(audit, SharingAudit::Found(ref entry) if entry.id == "06ab"));
    assert!(api.deletes().is_empty());
}

#[tokio::test]
async fn test_default_sharing_audit_survives_failure() {
    let api = Arc::new(FakeDriveApi::default());

    let audit = report_default_sharing(connector(&api).as_ref()).await;

    assert!(matches!(audit, SharingAudit::Failed(_)));
}
