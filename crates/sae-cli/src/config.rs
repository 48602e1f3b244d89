//! Run configuration: the REDCap endpoint, the SAE form layout, and the
//! projects to number.
//!
//! ```toml
//! api_url = "https://redcap.example.org/api/"
//!
//! [form]
//! event_name = "adverse_events_arm_1"
//!
//! [projects.HF01]
//! token_env = "REDCAP_TOKEN_HF01"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail, ensure};
use sae_redcap::RedcapForm;
use serde::Deserialize;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "SAE_NUMBERING_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sae-numbering.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// REDCap API endpoint shared by all projects.
    pub api_url: String,
    #[serde(default)]
    pub form: RedcapForm,
    pub projects: BTreeMap<String, ProjectConfig>,
}

/// Credentials of one project. Exactly one of `token` and `token_env` is set.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_env: Option<String>,
}

impl ProjectConfig {
    /// The API token, read from the environment when configured that way.
    pub fn resolve_token(&self, key: &str) -> Result<String> {
        let token = match (&self.token, &self.token_env) {
            (Some(token), None) => token.clone(),
            (None, Some(var)) => std::env::var(var)
                .with_context(|| format!("project {key}: read token from ${var}"))?,
            _ => bail!("project {key}: set exactly one of `token` or `token_env`"),
        };
        let token = token.trim().to_string();
        ensure!(!token.is_empty(), "project {key}: API token is empty");
        Ok(token)
    }

    /// Where the token comes from, safe to print.
    pub fn token_source(&self) -> String {
        match (&self.token, &self.token_env) {
            (Some(token), None) => format!("inline ({})", mask_token(token)),
            (None, Some(var)) => format!("${var}"),
            _ => "invalid".to_string(),
        }
    }
}

impl fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .finish()
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        ensure!(!url.is_empty(), "api_url must not be empty");
        ensure!(
            url.starts_with("https://") || url.starts_with("http://"),
            "api_url must be an http(s) URL, got {url:?}"
        );
        ensure!(!self.projects.is_empty(), "no projects configured");
        for (key, project) in &self.projects {
            ensure!(
                project.token.is_some() != project.token_env.is_some(),
                "project {key}: set exactly one of `token` or `token_env`"
            );
        }
        Ok(())
    }

    /// Project keys to process. An empty selection means every project.
    pub fn select_projects(&self, selected: &[String]) -> Result<Vec<String>> {
        if selected.is_empty() {
            return Ok(self.projects.keys().cloned().collect());
        }
        let mut keys = Vec::with_capacity(selected.len());
        for key in selected {
            if !self.projects.contains_key(key) {
                let known: Vec<&str> = self.projects.keys().map(String::as_str).collect();
                return Err(anyhow!(
                    "unknown project {key:?} (configured: {})",
                    known.join(", ")
                ));
            }
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        Ok(keys)
    }
}

/// Resolve the config path: explicit flag, then environment, then default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("load config: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("parse config")?;
    config.validate()?;
    Ok(config)
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("****{visible}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_tokens() {
        assert_eq!(mask_token("short"), "****");
        assert_eq!(mask_token("0123456789ABCDEF"), "****CDEF");
    }

    #[test]
    fn debug_redacts_token() {
        let project = ProjectConfig {
            token: Some("0123456789ABCDEF".to_string()),
            token_env: None,
        };
        let debug = format!("{project:?}");
        assert!(!debug.contains("0123456789ABCDEF"));
    }
}
