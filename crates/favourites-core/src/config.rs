use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::context::SiteContext;
use crate::service::FAVOURITES_LIST_NAME;

/// Environment variable that overrides the stored access token
pub const ACCESS_TOKEN_ENV: &str = "FAVOURITES_ACCESS_TOKEN";

/// Main configuration structure
///
/// Loaded from the config file, then the environment, then CLI flags on top.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load config from default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                config.auth.access_token = Some(token);
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("favourites");

        Ok(config_dir.join("config.toml"))
    }

    /// The identity context the service is built from. Both the site URL and
    /// the user login must be known.
    pub fn site_context(&self) -> crate::Result<SiteContext> {
        let web_url = self
            .site
            .web_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| crate::Error::ConfigError("site.web_url is not set".into()))?;
        let user_login = self
            .site
            .user_login
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| crate::Error::ConfigError("site.user_login is not set".into()))?;

        Ok(SiteContext::new(web_url, user_login))
    }

    /// Where the session database lives, creating its directory if needed
    pub fn session_db_path(&self) -> crate::Result<PathBuf> {
        let path = match &self.session.db_path {
            Some(path) => path.clone(),
            None => dirs::cache_dir()
                .ok_or_else(|| crate::Error::ConfigError("Could not find cache directory".into()))?
                .join("favourites")
                .join("session.db"),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute URL of the site holding the favourites list
    pub web_url: Option<String>,

    /// Root web of the site collection, used for user lookups.
    /// Defaults to `web_url`.
    pub root_web_url: Option<String>,

    /// Email or login of the current user
    pub user_login: Option<String>,

    #[serde(default = "default_list_name")]
    pub list_name: String,
}

fn default_list_name() -> String {
    FAVOURITES_LIST_NAME.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            web_url: None,
            root_web_url: None,
            user_login: None,
            list_name: default_list_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Bearer token sent with every request
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// SQLite file backing the session cache
    pub db_path: Option<PathBuf>,

    /// Name of the current session inside the database
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

fn default_session_id() -> String {
    "default".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            session_id: default_session_id(),
        }
    }
}
