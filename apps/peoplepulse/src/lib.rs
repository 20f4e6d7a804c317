//! PeoplePulse terminal front end: configuration and the page shell.

pub mod config;
pub mod shell;

use std::sync::Arc;

use anyhow::{Context, Result};
use platform_api::ApiClient;
use platform_authn::SessionStore;
use platform_storage::{FileStorage, Storage};
use platform_ui::NotificationCenter;
use products_hr::AppContext;

use crate::config::AppConfig;

/// Wire the long-lived services. The session is not restored here; callers
/// decide when startup has reached that point.
pub fn build_context(config: &AppConfig) -> Result<AppContext> {
    let api = ApiClient::new(&config.api_url)
        .with_context(|| format!("invalid API url `{}`", config.api_url))?;
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.state_dir));
    let session = SessionStore::new(api.clone(), storage);
    let notifications = NotificationCenter::new(config.notification_duration);
    Ok(AppContext::new(api, session, notifications))
}
