//! Drive share guard
//!
//! Watches a Google Drive account for newly created files and removes
//! "anyone with the link" sharing from them.

use anyhow::Context;
use bridge_desktop::{LoopbackCallbackListener, ReqwestHttpClient, TokioFileSystem};
use bridge_traits::{AuthCallbackListener, Clock, DriveClient, FileSystemAccess, HttpClient, SystemClock};
use core_auth::{ClientSecrets, CredentialManager, OAuthFlowManager, TokenStore};
use core_monitor::{report_default_sharing, Poller};
use core_runtime::logging::init_logging;
use core_runtime::MonitorConfig;
use provider_google_drive::GoogleDriveConnector;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MonitorConfig::from_env().context("invalid configuration")?;
    init_logging(config.logging.clone())?;

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    let fs: Arc<dyn FileSystemAccess> = Arc::new(TokioFileSystem::new().with_private_files(true));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let secrets = ClientSecrets::load(fs.as_ref(), &config.credentials_file)
        .await
        .with_context(|| {
            format!(
                "failed to load client secrets from {}",
                config.credentials_file.display()
            )
        })?;

    let listener = LoopbackCallbackListener::bind().await?;
    let oauth = secrets.oauth_config(listener.redirect_uri(), config.scopes.clone());
    let flow = OAuthFlowManager::new(oauth, http.clone());
    let token_store = TokenStore::new(fs, config.token_file.clone());

    let credentials = Arc::new(CredentialManager::new(
        flow,
        token_store,
        Arc::new(listener),
        clock.clone(),
    ));
    credentials
        .obtain_tokens()
        .await
        .context("failed to obtain Drive credentials")?;
    info!(token_file = %config.token_file.display(), "Credentials ready");

    let drive: Arc<dyn DriveClient> = Arc::new(GoogleDriveConnector::new(http, credentials));

    report_default_sharing(drive.as_ref()).await;
    Poller::new(drive, clock, &config).run_forever().await;

    Ok(())
}
