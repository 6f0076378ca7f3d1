//! Public-sharing inspection and remediation for a single file.

use crate::error::{MonitorError, Result};
use bridge_traits::drive::{DriveClient, FilePermissions, FileRef, GranteeType};
use tracing::{error, info, instrument, warn};

/// Result of revoking one `anyone` permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remediation {
    Revoked {
        permission_id: String,
    },
    Failed {
        permission_id: String,
        error: MonitorError,
    },
}

/// What inspection concluded about a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No entry grants access to anyone; the file was left untouched
    Private,
    /// One remediation per `anyone` entry, in permission order
    Public(Vec<Remediation>),
    /// Permissions could not be inspected; nothing was changed
    Skipped(MonitorError),
}

/// Per-file record of one inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: FileRef,
    /// Grantee type of the first permission entry, as logged
    pub first_grantee: Option<GranteeType>,
    pub verdict: Verdict,
}

impl FileOutcome {
    fn skipped(file: &FileRef, error: MonitorError) -> Self {
        Self {
            file: file.clone(),
            first_grantee: None,
            verdict: Verdict::Skipped(error),
        }
    }

    /// Permission IDs that were successfully deleted
    pub fn revoked(&self) -> Vec<&str> {
        match &self.verdict {
            Verdict::Public(remediations) => remediations
                .iter()
                .filter_map(|r| match r {
                    Remediation::Revoked { permission_id } => Some(permission_id.as_str()),
                    Remediation::Failed { .. } => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// True when every `anyone` entry found was deleted
    pub fn made_private(&self) -> bool {
        match &self.verdict {
            Verdict::Public(remediations) => remediations
                .iter()
                .all(|r| matches!(r, Remediation::Revoked { .. })),
            _ => false,
        }
    }
}

async fn fetch_permissions(client: &dyn DriveClient, file_id: &str) -> Result<FilePermissions> {
    client
        .get_file_permissions(file_id)
        .await
        .map_err(|e| MonitorError::provider("files.get", e))
}

async fn revoke(client: &dyn DriveClient, file_id: &str, permission_id: &str) -> Result<()> {
    client
        .delete_permission(file_id, permission_id)
        .await
        .map_err(|e| MonitorError::provider("permissions.delete", e))
}

/// Inspect a file's permissions and delete every `anyone` entry.
///
/// Never fails: provider errors are logged and reflected in the returned
/// [`FileOutcome`]. Non-public entries are never modified.
#[instrument(skip(client, file), fields(file_id = %file.id))]
pub async fn check_public_file(client: &dyn DriveClient, file: &FileRef) -> FileOutcome {
    let details = match fetch_permissions(client, &file.id).await {
        Ok(details) => details,
        Err(e) => {
            error!(error = %e, "Failed to fetch permissions for {} ({})", file.name, file.id);
            return FileOutcome::skipped(file, e);
        }
    };

    let Some(first) = details.permissions.first() else {
        warn!(
            "Filename: {} ({}) has no permission entries, skipping",
            details.name, details.id
        );
        return FileOutcome::skipped(
            file,
            MonitorError::NoPermissionsFound {
                file_id: file.id.clone(),
            },
        );
    };

    info!(
        "Filename: {} ({}) permissions is {}",
        details.name, details.id, first.grantee
    );
    let first_grantee = Some(first.grantee.clone());

    let mut remediations = Vec::new();
    for entry in details.public_entries() {
        let remediation = match revoke(client, &details.id, &entry.id).await {
            Ok(()) => {
                info!(
                    permission_id = %entry.id,
                    "Filename: {} ({}) permissions changed to private.",
                    details.name, details.id
                );
                Remediation::Revoked {
                    permission_id: entry.id.clone(),
                }
            }
            Err(e) => {
                error!(
                    permission_id = %entry.id,
                    error = %e,
                    "Filename: {} ({}) could not be made private",
                    details.name, details.id
                );
                Remediation::Failed {
                    permission_id: entry.id.clone(),
                    error: e,
                }
            }
        };
        remediations.push(remediation);
    }

    let verdict = if remediations.is_empty() {
        Verdict::Private
    } else {
        Verdict::Public(remediations)
    };

    FileOutcome {
        file: file.clone(),
        first_grantee,
        verdict,
    }
}
