//! Scripted `DriveClient` for unit tests.

use async_trait::async_trait;
use bridge_traits::drive::{AccountIdentity, DriveClient, FilePermissions, FileRef, PermissionEntry};
use bridge_traits::error::{BridgeError, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        after: DateTime<Utc>,
        folder_id: Option<String>,
    },
    GetPermissions(String),
    Delete(String, String),
    Identity,
    ListPermissions(String),
}

#[derive(Default)]
pub struct ScriptedDrive {
    pub files: Option<Vec<FileRef>>,
    pub permissions: HashMap<String, FilePermissions>,
    pub failing_deletes: HashSet<String>,
    pub identity: Option<AccountIdentity>,
    pub root_permissions: Option<Vec<PermissionEntry>>,
    pub calls: Mutex<Vec<Call>>,
}

impl ScriptedDrive {
    pub fn with_files(mut self, files: Vec<FileRef>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn with_permissions(mut self, permissions: FilePermissions) -> Self {
        self.permissions.insert(permissions.id.clone(), permissions);
        self
    }

    pub fn failing_delete(mut self, permission_id: &str) -> Self {
        self.failing_deletes.insert(permission_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn file_with(id: &str, name: &str, permissions: Vec<PermissionEntry>) -> FilePermissions {
    FilePermissions {
        id: id.to_string(),
        name: name.to_string(),
        web_view_link: None,
        permissions,
    }
}

#[async_trait]
impl DriveClient for ScriptedDrive {
    async fn list_files_created_after(
        &self,
        after: DateTime<Utc>,
        folder_id: Option<&str>,
    ) -> Result<Vec<FileRef>> {
        self.record(Call::List {
            after,
            folder_id: folder_id.map(str::to_string),
        });
        self.files
            .clone()
            .ok_or_else(|| BridgeError::OperationFailed("listing unavailable".to_string()))
    }

    async fn get_file_permissions(&self, file_id: &str) -> Result<FilePermissions> {
        self.record(Call::GetPermissions(file_id.to_string()));
        self.permissions
            .get(file_id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(format!("File not found: {}", file_id)))
    }

    async fn delete_permission(&self, file_id: &str, permission_id: &str) -> Result<()> {
        self.record(Call::Delete(file_id.to_string(), permission_id.to_string()));
        if self.failing_deletes.contains(permission_id) {
            return Err(BridgeError::OperationFailed("403 forbidden".to_string()));
        }
        Ok(())
    }

    async fn get_account_identity(&self) -> Result<AccountIdentity> {
        self.record(Call::Identity);
        self.identity
            .clone()
            .ok_or_else(|| BridgeError::OperationFailed("about unavailable".to_string()))
    }

    async fn list_permissions(&self, file_id: &str) -> Result<Vec<PermissionEntry>> {
        self.record(Call::ListPermissions(file_id.to_string()));
        self.root_permissions
            .clone()
            .ok_or_else(|| BridgeError::OperationFailed("permissions unavailable".to_string()))
    }
}
