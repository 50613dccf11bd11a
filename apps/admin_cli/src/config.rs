use std::fs;

use anyhow::Context;
use serde::Deserialize;
use shared::query::DEFAULT_PAGE_SIZE;
use url::Url;

pub const SETTINGS_FILE: &str = "admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub auth_token: Option<String>,
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080/".into(),
            auth_token: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    auth_token: Option<String>,
    page_size: Option<usize>,
}

impl Settings {
    /// Parsed base URL, with a trailing slash so collection paths join below it.
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let raw = self.server_url.trim();
        let raw = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        Url::parse(&raw).with_context(|| format!("invalid server url `{}`", self.server_url))
    }

    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw).context("malformed settings file")?;
        if let Some(v) = file_cfg.server_url {
            self.server_url = v;
        }
        if let Some(v) = file_cfg.auth_token {
            self.auth_token = Some(v);
        }
        if let Some(v) = file_cfg.page_size.filter(|size| *size > 0) {
            self.page_size = v;
        }
        Ok(())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        for key in ["ADMIN_SERVER_URL", "APP__SERVER_URL"] {
            if let Some(v) = var(key) {
                self.server_url = v;
            }
        }
        for key in ["ADMIN_AUTH_TOKEN", "APP__AUTH_TOKEN"] {
            if let Some(v) = var(key) {
                self.auth_token = Some(v);
            }
        }
        if let Some(v) = var("APP__PAGE_SIZE") {
            if let Ok(parsed) = v.parse::<usize>() {
                if parsed > 0 {
                    self.page_size = parsed;
                }
            }
        }
    }
}

/// Defaults, then `admin.toml` in the working directory, then environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        settings
            .apply_file(&raw)
            .with_context(|| format!("failed to read {SETTINGS_FILE}"))?;
    }
    settings.apply_env(|key| std::env::var(key).ok());

    Ok(settings)
}
