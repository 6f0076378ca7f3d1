//! Google Drive API response types
//!
//! Data structures for deserializing Google Drive API v3 responses. Only the
//! fields requested through the `fields` parameter are modelled.

use bridge_traits::drive::{AccountIdentity, FilePermissions, FileRef, GranteeType, PermissionEntry};
use serde::Deserialize;

/// Minimal file resource returned by `files.list`
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFileRef {
    pub id: String,
    pub name: String,
}

impl From<DriveFileRef> for FileRef {
    fn from(file: DriveFileRef) -> Self {
        FileRef::new(file.id, file.name)
    }
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<DriveFileRef>,

    /// Token for next page
    pub next_page_token: Option<String>,
}

/// Google Drive API permission resource
///
/// See: https://developers.google.com/drive/api/v3/reference/permissions#resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivePermission {
    pub id: String,

    /// Always `drive#permission`
    pub kind: Option<String>,

    /// `user`, `group`, `domain` or `anyone`
    #[serde(rename = "type")]
    pub permission_type: String,

    #[serde(default)]
    pub role: String,

    pub email_address: Option<String>,
}

impl From<DrivePermission> for PermissionEntry {
    fn from(permission: DrivePermission) -> Self {
        PermissionEntry {
            id: permission.id,
            kind: permission.kind,
            grantee: GranteeType::parse(&permission.permission_type),
            role: permission.role,
            email_address: permission.email_address,
        }
    }
}

/// File resource returned by `files.get` with its permission list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileWithPermissions {
    pub id: String,
    pub name: String,
    pub web_view_link: Option<String>,

    /// Omitted when the caller may not read permissions
    #[serde(default)]
    pub permissions: Vec<DrivePermission>,
}

impl From<DriveFileWithPermissions> for FilePermissions {
    fn from(file: DriveFileWithPermissions) -> Self {
        FilePermissions {
            id: file.id,
            name: file.name,
            web_view_link: file.web_view_link,
            permissions: file.permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Google Drive API permissions.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/permissions/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionListResponse {
    #[serde(default)]
    pub permissions: Vec<DrivePermission>,

    pub next_page_token: Option<String>,
}

/// Google Drive API about.get response (`fields=user`)
#[derive(Debug, Deserialize)]
pub struct AboutResponse {
    pub user: DriveUser,
}

/// The authenticated user as reported by `about.get`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    pub permission_id: String,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

impl From<DriveUser> for AccountIdentity {
    fn from(user: DriveUser) -> Self {
        AccountIdentity {
            permission_id: user.permission_id,
            display_name: user.display_name,
            email_address: user.email_address,
        }
    }
}

/// Error envelope returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}
