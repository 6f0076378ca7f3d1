//! Cloud Drive Abstraction
//!
//! The capability the monitor needs from a cloud file store: list recently
//! created files, inspect and delete their permissions, and identify the
//! account that owns the credential.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// A file returned by a listing query.
///
/// Only the fields the monitor requests are carried. Instances are transient
/// and are never tracked across polling cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Provider file ID
    pub id: String,
    /// Display name
    pub name: String,
}

impl FileRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Grantee type of a permission entry.
///
/// Unknown provider values are preserved in [`GranteeType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GranteeType {
    /// Anyone holding the link, without authentication
    Anyone,
    /// A single user account
    User,
    /// Every member of a domain
    Domain,
    /// A group address
    Group,
    /// Any other value reported by the provider
    Other(String),
}

impl GranteeType {
    pub fn parse(s: &str) -> Self {
        match s {
            "anyone" => GranteeType::Anyone,
            "user" => GranteeType::User,
            "domain" => GranteeType::Domain,
            "group" => GranteeType::Group,
            other => GranteeType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GranteeType::Anyone => "anyone",
            GranteeType::User => "user",
            GranteeType::Domain => "domain",
            GranteeType::Group => "group",
            GranteeType::Other(value) => value,
        }
    }

    /// Whether this grantee exposes the file publicly
    pub fn is_public(&self) -> bool {
        matches!(self, GranteeType::Anyone)
    }
}

impl From<String> for GranteeType {
    fn from(value: String) -> Self {
        GranteeType::parse(&value)
    }
}

impl From<GranteeType> for String {
    fn from(value: GranteeType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for GranteeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-side access-control record attached to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    /// Permission ID, used to delete the entry
    pub id: String,
    /// Resource kind as reported by the provider (e.g. `drive#permission`)
    pub kind: Option<String>,
    /// Who the permission grants access to
    pub grantee: GranteeType,
    /// Granted role (`reader`, `writer`, `owner`, ...)
    pub role: String,
    /// Grantee email address, for user and group permissions
    pub email_address: Option<String>,
}

impl PermissionEntry {
    pub fn new(id: impl Into<String>, grantee: GranteeType, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            grantee,
            role: role.into(),
            email_address: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_address = Some(email.into());
        self
    }
}

/// A file together with its full permission list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePermissions {
    pub id: String,
    pub name: String,
    /// Browser link to the file
    pub web_view_link: Option<String>,
    /// Permissions in provider order
    pub permissions: Vec<PermissionEntry>,
}

impl FilePermissions {
    /// Entries granting access to anyone with the link
    pub fn public_entries(&self) -> impl Iterator<Item = &PermissionEntry> {
        self.permissions.iter().filter(|p| p.grantee.is_public())
    }
}

/// Identity of the account behind the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    /// The account's own permission ID
    pub permission_id: String,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

/// Cloud drive capability consumed by the monitor.
///
/// Calls are issued strictly sequentially by a single task; implementations
/// do not need to coordinate concurrent callers beyond `Send + Sync`.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::drive::DriveClient;
///
/// async fn count_new(client: &dyn DriveClient, after: DateTime<Utc>) -> Result<usize> {
///     Ok(client.list_files_created_after(after, None).await?.len())
/// }
/// ```
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// List files whose creation time is strictly after `after`.
    ///
    /// When `folder_id` is given, only direct children of that folder are
    /// returned. Results are in provider order.
    async fn list_files_created_after(
        &self,
        after: DateTime<Utc>,
        folder_id: Option<&str>,
    ) -> Result<Vec<FileRef>>;

    /// Fetch a file's name, link and complete permission list.
    async fn get_file_permissions(&self, file_id: &str) -> Result<FilePermissions>;

    /// Delete a single permission from a file.
    async fn delete_permission(&self, file_id: &str, permission_id: &str) -> Result<()>;

    /// Fetch the identity of the authenticated account.
    async fn get_account_identity(&self) -> Result<AccountIdentity>;

    /// List the permissions attached to a file or container (e.g. `root`).
    async fn list_permissions(&self, file_id: &str) -> Result<Vec<PermissionEntry>>;
}
