use crate::errors::{IssueBranchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".issue-branch.toml";
pub const ENV_PREFIX: &str = "ISSUE_BRANCH";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub owner: String,
    pub repo: String,
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Settings {
    pub fn new(owner: String, repo: String, token: String) -> Self {
        Self {
            owner,
            repo,
            token,
            api_url: default_api_url(),
        }
    }

    /// Loads the settings file, with `ISSUE_BRANCH_*` environment variables
    /// taking precedence over its values. `Ok(None)` means the file is absent.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(path: &Path, env: Option<HashMap<String, String>>) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = ::config::Config::builder()
            .add_source(::config::File::new(
                &path.to_string_lossy(),
                ::config::FileFormat::Toml,
            ))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).source(env))
            .build()?;

        let settings: Settings = raw.try_deserialize()?;
        settings.validate()?;

        Ok(Some(settings))
    }

    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("token", &self.token),
            ("api_url", &self.api_url),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(IssueBranchError::ConfigInvalid(format!(
                "Missing value for: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(IssueBranchError::ConfigAlreadyExists(
                path.display().to_string(),
            ));
        }

        let config_str = toml::to_string_pretty(self)
            .map_err(|e| IssueBranchError::Other(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, config_str)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }
}
