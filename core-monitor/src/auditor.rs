//! One-shot startup report of the account's default sharing entry.

use crate::error::MonitorError;
use bridge_traits::drive::{DriveClient, PermissionEntry};
use core_runtime::logging::redact_if_sensitive;
use tracing::{error, info};

/// Container whose permissions carry the account's default sharing entry.
const ROOT_CONTAINER: &str = "root";

/// Outcome of [`report_default_sharing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharingAudit {
    /// The root entry matching the account's own permission ID
    Found(PermissionEntry),
    NotFound,
    /// A provider call failed; startup continues regardless
    Failed(MonitorError),
}

/// Log the account's default sharing setting.
///
/// Advisory only: nothing is modified, and provider failures are logged and
/// returned as [`SharingAudit::Failed`] instead of aborting startup.
pub async fn report_default_sharing(client: &dyn DriveClient) -> SharingAudit {
    let identity = match client.get_account_identity().await {
        Ok(identity) => identity,
        Err(e) => {
            let e = MonitorError::provider("about.get", e);
            error!(error = %e, "Failed to fetch account identity");
            return SharingAudit::Failed(e);
        }
    };

    let permissions = match client.list_permissions(ROOT_CONTAINER).await {
        Ok(permissions) => permissions,
        Err(e) => {
            let e = MonitorError::provider("permissions.list", e);
            error!(error = %e, "Failed to list root permissions");
            return SharingAudit::Failed(e);
        }
    };

    match permissions
        .into_iter()
        .find(|entry| entry.id == identity.permission_id)
    {
        Some(entry) => {
            let email = entry
                .email_address
                .as_deref()
                .map(|email| redact_if_sensitive("email", email))
                .unwrap_or_default();
            info!(
                permission_id = %entry.id,
                grantee = %entry.grantee,
                role = %entry.role,
                email = %email,
                "Default sharing settings"
            );
            SharingAudit::Found(entry)
        }
        None => {
            info!("No default sharing settings found.");
            SharingAudit::NotFound
        }
    }
}
