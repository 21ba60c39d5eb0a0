//! Project configuration for modoc

use crate::plan::MergeMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding modoc state inside a project
pub const CONFIG_DIR: &str = ".modoc";

/// Configuration for a documented project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Merge preference between local and remote documents
    #[serde(default)]
    pub mode: MergeMode,

    /// Keep near-identical copies instead of collapsing them
    #[serde(default)]
    pub show_duplicates: bool,

    /// Include local documents even when a remote provider is available
    #[serde(default = "default_true")]
    pub include_local: bool,

    /// Secondary folder searched after the project root
    #[serde(default = "default_secondary_dir")]
    pub secondary_dir: Option<String>,

    /// Folders of supplemental documents, relative to the project root
    #[serde(default = "default_doc_folders")]
    pub doc_folders: Vec<String>,

    /// Folders of example scripts, relative to the project root
    #[serde(default)]
    pub script_folders: Vec<String>,

    /// Introduction text shown ahead of the standard documents
    #[serde(default)]
    pub introduction: Option<String>,

    /// Remote repository settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Help subsystem settings
    #[serde(default)]
    pub help: HelpConfig,
}

/// Remote repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Fetch remote documents on every run
    #[serde(default)]
    pub enabled: bool,

    /// Repository slug (e.g., "owner/name"); detected from the git origin when absent
    pub repository: Option<String>,

    /// Branch to read from; the provider default branch when absent
    pub branch: Option<String>,

    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

/// Help subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpConfig {
    /// Program producing the raw help dump
    #[serde(default = "default_help_program")]
    pub program: String,

    /// Program arguments; `{command}` is replaced with the command name
    #[serde(default = "default_help_args")]
    pub args: Vec<String>,

    /// Timeout in seconds for one help dump
    #[serde(default = "default_help_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_secondary_dir() -> Option<String> {
    Some("docs".to_string())
}

fn default_doc_folders() -> Vec<String> {
    vec!["docs/articles".to_string()]
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_remote_timeout() -> u64 {
    15
}

fn default_help_program() -> String {
    "pwsh".to_string()
}

fn default_help_args() -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        "Get-Help {command} -Full | Out-String -Width 4096".to_string(),
    ]
}

fn default_help_timeout() -> u64 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repository: None,
            branch: None,
            api_base: default_api_base(),
            timeout_secs: default_remote_timeout(),
        }
    }
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            program: default_help_program(),
            args: default_help_args(),
            timeout_secs: default_help_timeout(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            mode: MergeMode::default(),
            show_duplicates: false,
            include_local: true,
            secondary_dir: default_secondary_dir(),
            doc_folders: default_doc_folders(),
            script_folders: Vec::new(),
            introduction: None,
            remote: RemoteConfig::default(),
            help: HelpConfig::default(),
        }
    }
}

impl DocsConfig {
    /// Path of the configuration file for a project root
    pub fn path(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_DIR).join("config.toml")
    }

    /// Load configuration from the project or return defaults
    pub fn load_or_default(project_root: &Path) -> Result<Self> {
        let config_path = Self::path(project_root);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: DocsConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the project
    pub fn save(&self, project_root: &Path) -> Result<()> {
        let config_dir = project_root.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {:?}", config_dir))?;

        let config_path = Self::path(project_root);
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Secondary folder resolved against the project root
    pub fn secondary_path(&self, project_root: &Path) -> Option<PathBuf> {
        self.secondary_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| project_root.join(dir))
    }

    /// Look up a single value by key for display
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "mode" => self.mode.to_string(),
            "show_duplicates" => self.show_duplicates.to_string(),
            "include_local" => self.include_local.to_string(),
            "secondary_dir" => self.secondary_dir.clone().unwrap_or_default(),
            "introduction" => self.introduction.clone().unwrap_or_default(),
            "remote.enabled" => self.remote.enabled.to_string(),
            "remote.repository" => self.remote.repository.clone().unwrap_or_default(),
            "remote.branch" => self.remote.branch.clone().unwrap_or_default(),
            "remote.api_base" => self.remote.api_base.clone(),
            "remote.timeout_secs" => self.remote.timeout_secs.to_string(),
            "help.program" => self.help.program.clone(),
            "help.timeout_secs" => self.help.timeout_secs.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Update a single value by key; an empty value clears optional keys
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let flag = || -> Result<bool> {
            value
                .parse::<bool>()
                .with_context(|| format!("Expected true or false for {}, got {:?}", key, value))
        };
        let seconds = || -> Result<u64> {
            value
                .parse::<u64>()
                .with_context(|| format!("Expected a number of seconds for {}, got {:?}", key, value))
        };
        let optional = || (!value.is_empty()).then(|| value.to_string());

        match key {
            "mode" => {
                self.mode = <MergeMode as clap::ValueEnum>::from_str(value, true)
                    .map_err(|e| anyhow::anyhow!("Invalid mode {:?}: {}", value, e))?
            }
            "show_duplicates" => self.show_duplicates = flag()?,
            "include_local" => self.include_local = flag()?,
            "secondary_dir" => self.secondary_dir = optional(),
            "introduction" => self.introduction = optional(),
            "remote.enabled" => self.remote.enabled = flag()?,
            "remote.repository" => self.remote.repository = optional(),
            "remote.branch" => self.remote.branch = optional(),
            "remote.api_base" => self.remote.api_base = value.to_string(),
            "remote.timeout_secs" => self.remote.timeout_secs = seconds()?,
            "help.program" => self.help.program = value.to_string(),
            "help.timeout_secs" => self.help.timeout_secs = seconds()?,
            _ => anyhow::bail!("Unknown config key: {}", key),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DocsConfig::default();
        assert_eq!(config.mode, MergeMode::PreferLocal);
        assert!(config.include_local);
        assert!(!config.show_duplicates);
        assert!(config.help.args.iter().any(|a| a.contains("{command}")));
    }

    #[test]
    fn test_set_values() {
        let mut config = DocsConfig::default();
        config.set("mode", "Prefer-Remote").unwrap();
        config.set("remote.enabled", "true").unwrap();
        config.set("remote.repository", "owner/name").unwrap();
        config.set("secondary_dir", "").unwrap();
        config.set("help.timeout_secs", "5").unwrap();

        assert_eq!(config.mode, MergeMode::PreferRemote);
        assert!(config.remote.enabled);
        assert_eq!(config.get("remote.repository").as_deref(), Some("owner/name"));
        assert_eq!(config.secondary_dir, None);
        assert_eq!(config.help.timeout_secs, 5);

        assert!(config.set("include_local", "maybe").is_err());
        assert!(config.set("mode", "newest").is_err());
        assert!(config.set("no.such.key", "1").is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: DocsConfig = toml::from_str(
            r#"
mode = "all"
show_duplicates = true

[remote]
repository = "owner/name"
"#,
        )
        .unwrap();

        assert_eq!(config.mode, MergeMode::All);
        assert!(config.show_duplicates);
        assert_eq!(config.remote.repository.as_deref(), Some("owner/name"));
        assert_eq!(config.remote.api_base, "https://api.github.com");
        assert_eq!(config.secondary_dir.as_deref(), Some("docs"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DocsConfig::default();
        config.introduction = Some("Welcome".to_string());
        config.save(dir.path()).unwrap();

        let loaded = DocsConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.introduction.as_deref(), Some("Welcome"));
        assert_eq!(loaded.get("mode").as_deref(), Some("prefer-local"));
        assert_eq!(loaded.get("nope"), None);
    }
}
