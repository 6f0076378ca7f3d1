//! Google Drive API connector implementation
//!
//! Implements the `DriveClient` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::auth::AccessTokenSource;
use bridge_traits::drive::{AccountIdentity, DriveClient, FilePermissions, FileRef, PermissionEntry};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{GoogleDriveError, Result};
use crate::types::{
    AboutResponse, DriveFileWithPermissions, ErrorResponse, FilesListResponse,
    PermissionListResponse,
};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Maximum results per page (Google Drive API limit)
const MAX_PAGE_SIZE: u32 = 1000;

/// Largest page the permissions endpoint accepts
const PERMISSION_PAGE_SIZE: u32 = 100;

/// Fields to request for each permission
const PERMISSION_FIELDS: &str = "kind,id,emailAddress,role,type";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Render the `files.list` query selecting files created after `after`.
///
/// The timestamp is RFC 3339 UTC with a `Z` suffix, which is the only form
/// the Drive query language compares correctly.
pub fn created_after_query(after: DateTime<Utc>, folder_id: Option<&str>) -> String {
    let created = format!(
        "createdTime > '{}'",
        after.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    match folder_id {
        Some(folder_id) => format!("'{}' in parents and {}", folder_id, created),
        None => created,
    }
}

/// Google Drive API connector
///
/// Implements `DriveClient` for Google Drive API v3.
///
/// # Features
///
/// - Creation-time file listing, optionally restricted to one folder
/// - Permission inspection and deletion
/// - Account identity lookup via `about.get`
/// - Pagination over `nextPageToken`
///
/// Every request asks the [`AccessTokenSource`] for a bearer token, so a
/// long-running monitor keeps working across token expiry. Requests go out
/// with [`RetryPolicy::no_retry`], so each Drive call is made exactly once.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::drive::DriveClient;
///
/// let connector = GoogleDriveConnector::new(http_client, credentials);
/// let files = connector.list_files_created_after(lower_bound, None).await?;
/// ```
pub struct GoogleDriveConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Supplier of OAuth 2.0 access tokens
    token_source: Arc<dyn AccessTokenSource>,
}

impl GoogleDriveConnector {
    /// Create a new Google Drive connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `token_source` - Access tokens with the full `drive` scope
    pub fn new(http_client: Arc<dyn HttpClient>, token_source: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            http_client,
            token_source,
        }
    }

    async fn request(&self, method: HttpMethod, url: String) -> Result<HttpRequest> {
        let token = self.token_source.access_token().await.map_err(|e| {
            GoogleDriveError::AuthenticationFailed(format!("no access token available: {}", e))
        })?;

        Ok(HttpRequest::new(method, url)
            .bearer_token(token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT))
    }

    /// Send a request and map non-2xx statuses to provider errors.
    ///
    /// `resource` names the file the request addresses, for 404 reporting.
    /// Every call is a single attempt; a failure surfaces to the caller.
    #[instrument(skip_all, fields(url = %url))]
    async fn send(&self, method: HttpMethod, url: String, resource: &str) -> Result<HttpResponse> {
        let request = self.request(method, url).await?;
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await?;

        if response.is_success() {
            debug!(status = response.status, "API request succeeded");
            return Ok(response);
        }

        let status = response.status;
        let message = error_message(&response);
        warn!(status = status, error = %message, "API request failed");

        Err(match status {
            401 => GoogleDriveError::AuthenticationFailed(message),
            404 => GoogleDriveError::NotFound {
                resource: resource.to_string(),
            },
            429 => GoogleDriveError::RateLimitExceeded {
                retry_after_seconds: response
                    .header("retry-after")
                    .and_then(|value| value.trim().parse().ok())
                    .unwrap_or(0),
            },
            _ => GoogleDriveError::ApiError {
                status_code: status,
                message,
            },
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, resource: &str) -> Result<T> {
        let response = self.send(HttpMethod::Get, url, resource).await?;

        serde_json::from_slice(&response.body).map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse {} response: {}", resource, e))
        })
    }

    async fn list_files(
        &self,
        after: DateTime<Utc>,
        folder_id: Option<&str>,
    ) -> Result<Vec<FileRef>> {
        let query = created_after_query(after, folder_id);
        debug!(query = %query, "Listing files");

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/files?q={}&pageSize={}&fields=nextPageToken,files(id,name)",
                DRIVE_API_BASE,
                urlencoding::encode(&query),
                MAX_PAGE_SIZE
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let page: FilesListResponse = self.get_json(url, "files").await?;
            files.extend(page.files.into_iter().map(FileRef::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!("Listed {} files from Google Drive", files.len());
        Ok(files)
    }

    async fn file_permissions(&self, file_id: &str) -> Result<FilePermissions> {
        let url = format!(
            "{}/files/{}?fields=permissions({}),id,name,webViewLink",
            DRIVE_API_BASE,
            urlencoding::encode(file_id),
            PERMISSION_FIELDS
        );

        let file: DriveFileWithPermissions = self.get_json(url, file_id).await?;
        Ok(file.into())
    }

    async fn remove_permission(&self, file_id: &str, permission_id: &str) -> Result<()> {
        let url = format!(
            "{}/files/{}/permissions/{}",
            DRIVE_API_BASE,
            urlencoding::encode(file_id),
            urlencoding::encode(permission_id)
        );

        self.send(HttpMethod::Delete, url, file_id).await?;
        info!(file_id = %file_id, permission_id = %permission_id, "Deleted permission");
        Ok(())
    }

    async fn about_user(&self) -> Result<AccountIdentity> {
        let url = format!("{}/about?fields=user", DRIVE_API_BASE);

        let about: AboutResponse = self.get_json(url, "about").await?;
        Ok(about.user.into())
    }

    async fn permissions_of(&self, file_id: &str) -> Result<Vec<PermissionEntry>> {
        let mut permissions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/files/{}/permissions?pageSize={}&fields=nextPageToken,permissions({})",
                DRIVE_API_BASE,
                urlencoding::encode(file_id),
                PERMISSION_PAGE_SIZE,
                PERMISSION_FIELDS
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let page: PermissionListResponse = self.get_json(url, file_id).await?;
            permissions.extend(page.permissions.into_iter().map(PermissionEntry::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(permissions)
    }
}

/// Extract the human-readable message from an error response.
fn error_message(response: &HttpResponse) -> String {
    match serde_json::from_slice::<ErrorResponse>(&response.body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => String::from_utf8_lossy(&response.body).to_string(),
    }
}

#[async_trait]
impl DriveClient for GoogleDriveConnector {
    #[instrument(skip(self), fields(after = %after))]
    async fn list_files_created_after(
        &self,
        after: DateTime<Utc>,
        folder_id: Option<&str>,
    ) -> BridgeResult<Vec<FileRef>> {
        Ok(self.list_files(after, folder_id).await?)
    }

    #[instrument(skip(self))]
    async fn get_file_permissions(&self, file_id: &str) -> BridgeResult<FilePermissions> {
        Ok(self.file_permissions(file_id).await?)
    }

    #[instrument(skip(self))]
    async fn delete_permission(&self, file_id: &str, permission_id: &str) -> BridgeResult<()> {
        Ok(self.remove_permission(file_id, permission_id).await?)
    }

    #[instrument(skip(self))]
    async fn get_account_identity(&self) -> BridgeResult<AccountIdentity> {
        Ok(self.about_user().await?)
    }

    #[instrument(skip(self))]
    async fn list_permissions(&self, file_id: &str) -> BridgeResult<Vec<PermissionEntry>> {
        Ok(self.permissions_of(file_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::drive::GranteeType;
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use chrono::TimeZone;
    use mockall::{mock, Sequence};
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    struct StaticToken;

    #[async_trait]
    impl AccessTokenSource for StaticToken {
        async fn access_token(&self) -> BridgeResult<String> {
            Ok("test_token".to_string())
        }
    }

    struct NoToken;

    #[async_trait]
    impl AccessTokenSource for NoToken {
        async fn access_token(&self) -> BridgeResult<String> {
            Err(BridgeError::NotAvailable("Not authenticated".to_string()))
        }
    }

    fn connector(mock_http: MockHttpClient) -> GoogleDriveConnector {
        GoogleDriveConnector::new(Arc::new(mock_http), Arc::new(StaticToken))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn decoded(url: &str) -> String {
        urlencoding::decode(url).unwrap().into_owned()
    }

    fn lower_bound() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 16, 7, 59, 0).unwrap()
    }

    #[test]
    fn test_created_after_query() {
        assert_eq!(
            created_after_query(lower_bound(), None),
            "createdTime > '2023-02-16T07:59:00Z'"
        );
        assert_eq!(
            created_after_query(lower_bound(), Some("folder1")),
            "'folder1' in parents and createdTime > '2023-02-16T07:59:00Z'"
        );
    }

    #[tokio::test]
    async fn test_list_files_sends_query_and_token() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .withf(|request| {
                let url = decoded(&request.url);
                request.method == HttpMethod::Get
                    && url.starts_with("https://www.googleapis.com/drive/v3/files?")
                    && url.contains("q=createdTime > '2023-02-16T07:59:00Z'")
                    && url.contains("fields=nextPageToken,files(id,name)")
                    && request.headers.get("Authorization").map(String::as_str)
                        == Some("Bearer test_token")
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"files": [{"id": "f1", "name": "report.pdf"}]}"#,
                ))
            });

        let files = connector(mock_http)
            .list_files_created_after(lower_bound(), None)
            .await
            .unwrap();

        assert_eq!(files, vec![FileRef::new("f1", "report.pdf")]);
    }

    #[tokio::test]
    async fn test_list_files_follows_pagination() {
        let mut mock_http = MockHttpClient::new();
        let mut seq = Sequence::new();

        mock_http
            .expect_execute()
            .withf(|request| !request.url.contains("&pageToken="))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"files": [{"id": "f1", "name": "a"}], "nextPageToken": "page2"}"#,
                ))
            });
        mock_http
            .expect_execute()
            .withf(|request| request.url.contains("&pageToken=page2"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, r#"{"files": [{"id": "f2", "name": "b"}]}"#)));

        let files = connector(mock_http)
            .list_files_created_after(lower_bound(), Some("folder1"))
            .await
            .unwrap();

        let ids: Vec<_> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2"]);
    }

    #[tokio::test]
    async fn test_list_files_empty_result() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, r#"{"files": []}"#)));

        let files = connector(mock_http)
            .list_files_created_after(lower_bound(), None)
            .await
            .unwrap();

        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_get_file_permissions() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request| {
                decoded(&request.url)
                    == "https://www.googleapis.com/drive/v3/files/f1?fields=permissions(kind,id,emailAddress,role,type),id,name,webViewLink"
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"id": "f1", "name": "report.pdf",
                        "permissions": [{"id": "p1", "type": "anyone", "role": "reader"}]}"#,
                ))
            });

        let file = connector(mock_http).get_file_permissions("f1").await.unwrap();

        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.permissions[0].id, "p1");
        assert_eq!(file.permissions[0].grantee, GranteeType::Anyone);
    }

    #[tokio::test]
    async fn test_get_file_permissions_not_found() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|_| {
            Ok(response(
                404,
                r#"{"error": {"code": 404, "message": "File not found: f9."}}"#,
            ))
        });

        let result = connector(mock_http).get_file_permissions("f9").await;
        assert!(matches!(result, Err(BridgeError::NotFound(msg)) if msg.contains("f9")));
    }

    /// Transport that resends retryable statuses as its policy allows
    struct UnavailableDrive {
        hits: std::sync::Mutex<u32>,
    }

    #[async_trait]
    impl HttpClient for UnavailableDrive {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.execute_with_retry(request, RetryPolicy::default()).await
        }

        async fn execute_with_retry(
            &self,
            _request: HttpRequest,
            policy: RetryPolicy,
        ) -> BridgeResult<HttpResponse> {
            *self.hits.lock().unwrap() += policy.max_attempts.max(1);
            Ok(response(
                503,
                r#"{"error": {"code": 503, "message": "Backend Error"}}"#,
            ))
        }
    }

    #[tokio::test]
    async fn test_unavailable_drive_is_sent_once() {
        let http = Arc::new(UnavailableDrive {
            hits: std::sync::Mutex::new(0),
        });
        let connector = GoogleDriveConnector::new(http.clone(), Arc::new(StaticToken));

        let result = connector.delete_permission("f1", "p1").await;

        assert!(matches!(result, Err(BridgeError::OperationFailed(msg)) if msg.contains("503")));
        assert_eq!(*http.hits.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(503, r#"{"error": {"code": 503, "message": "Backend Error"}}"#)));

        let result = connector(mock_http).get_file_permissions("f1").await;

        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
    }

    #[tokio::test]
    async fn test_delete_permission() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Delete
                    && request.url == "https://www.googleapis.com/drive/v3/files/f1/permissions/p1"
            })
            .times(1)
            .returning(|_| Ok(response(204, "")));

        connector(mock_http)
            .delete_permission("f1", "p1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_permission_forbidden_reports_message() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|_| {
            Ok(response(
                403,
                r#"{"error": {"code": 403, "message": "The user does not have sufficient permissions for this file."}}"#,
            ))
        });

        let result = connector(mock_http).delete_permission("f1", "p1").await;

        match result {
            Err(BridgeError::OperationFailed(msg)) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("sufficient permissions"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|_| {
            let mut response = response(429, "slow down");
            response
                .headers
                .insert("retry-after".to_string(), "7".to_string());
            Ok(response)
        });

        let result = connector(mock_http).about_user().await;
        assert!(matches!(
            result,
            Err(GoogleDriveError::RateLimitExceeded {
                retry_after_seconds: 7
            })
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_failure() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(401, r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#)));

        let result = connector(mock_http).about_user().await;
        assert!(matches!(
            result,
            Err(GoogleDriveError::AuthenticationFailed(msg)) if msg == "Invalid Credentials"
        ));
    }

    #[tokio::test]
    async fn test_missing_token_skips_request() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().never();

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), Arc::new(NoToken));
        let result = connector.get_account_identity().await;

        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
    }

    #[tokio::test]
    async fn test_get_account_identity() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request| request.url == "https://www.googleapis.com/drive/v3/about?fields=user")
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"user": {"permissionId": "06ab", "displayName": "Owner"}}"#,
                ))
            });

        let identity = connector(mock_http).get_account_identity().await.unwrap();
        assert_eq!(identity.permission_id, "06ab");
    }

    #[tokio::test]
    async fn test_list_root_permissions() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request| {
                request
                    .url
                    .starts_with("https://www.googleapis.com/drive/v3/files/root/permissions?")
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"permissions": [{"id": "06ab", "type": "user", "role": "owner",
                                         "emailAddress": "owner@example.com"}]}"#,
                ))
            });

        let permissions = connector(mock_http).list_permissions("root").await.unwrap();

        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].id, "06ab");
        assert_eq!(permissions[0].role, "owner");
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, "<html>")));

        let result = connector(mock_http).file_permissions("f1").await;
        assert!(matches!(result, Err(GoogleDriveError::ParseError(_))));
    }
}
