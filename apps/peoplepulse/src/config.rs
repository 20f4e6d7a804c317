use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_NOTIFY_MS: u64 = 5000;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub state_dir: PathBuf,
    /// Shows raw error text on fallback screens.
    pub development: bool,
    pub notification_duration: Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("PEOPLEPULSE_API_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());

        let state_dir = lookup("PEOPLEPULSE_STATE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| match lookup("HOME") {
                Some(home) => PathBuf::from(home).join(".peoplepulse"),
                None => PathBuf::from(".peoplepulse"),
            });

        let development = lookup("PEOPLEPULSE_ENV")
            .map(|val| matches!(val.to_lowercase().as_str(), "dev" | "development"))
            .unwrap_or(false);

        let notification_ms = match lookup("PEOPLEPULSE_NOTIFY_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid PEOPLEPULSE_NOTIFY_MS `{raw}`"))?,
            None => DEFAULT_NOTIFY_MS,
        };

        Ok(Self {
            api_url,
            state_dir,
            development,
            notification_duration: Duration::from_millis(notification_ms),
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, api_url: Option<String>, state_dir: Option<PathBuf>) -> Self {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        if let Some(state_dir) = state_dir {
            self.state_dir = state_dir;
        }
        self
    }
}
