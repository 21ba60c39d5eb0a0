//! Token resolution for remote providers

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variables consulted in priority order
pub const TOKEN_ENV_VARS: &[&str] = &["MODOC_GITHUB_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// Tokens persisted per host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenStore {
    #[serde(default)]
    hosts: BTreeMap<String, String>,
}

impl TokenStore {
    /// Default location of the token store
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("modoc").join("tokens.toml"))
    }

    /// Load the store from a path; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token store: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse token store: {:?}", path))
    }

    /// Load from the default location, ignoring any failure
    pub fn load_default() -> Self {
        Self::default_path()
            .and_then(|path| match Self::load(&path) {
                Ok(store) => Some(store),
                Err(e) => {
                    tracing::warn!("Ignoring token store: {:#}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Save the store to a path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize token store")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write token store: {:?}", path))?;
        Ok(())
    }

    pub fn get(&self, host: &str) -> Option<&str> {
        self.hosts.get(&host.to_lowercase()).map(String::as_str)
    }

    pub fn set(&mut self, host: &str, token: &str) {
        self.hosts.insert(host.to_lowercase(), token.to_string());
    }
}

/// Token store host for an API base URL (`https://api.github.com` is `github.com`)
pub fn host_of(api_base: &str) -> String {
    let rest = api_base
        .split_once("://")
        .map_or(api_base, |(_, rest)| rest);
    let host = rest.split(['/', ':']).next().unwrap_or(rest);
    host.strip_prefix("api.").unwrap_or(host).to_lowercase()
}

/// Resolve a token: explicit, then environment, then the per-host store
pub fn resolve_token(explicit: Option<&str>, host: &str, store: &TokenStore) -> Option<String> {
    resolve_token_with(explicit, host, store, |name| std::env::var(name).ok())
}

/// Token resolution with an injectable environment lookup
pub fn resolve_token_with<F>(
    explicit: Option<&str>,
    host: &str,
    store: &TokenStore,
    env: F,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let usable = |t: &str| -> Option<String> {
        let t = t.trim();
        (!t.is_empty()).then(|| t.to_string())
    };

    explicit
        .and_then(usable)
        .or_else(|| {
            TOKEN_ENV_VARS
                .iter()
                .find_map(|name| env(name).as_deref().and_then(usable))
        })
        .or_else(|| store.get(host).and_then(usable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_resolution_order() {
        let mut store = TokenStore::default();
        store.set("GitHub.com", "stored");

        let env = env_of(&[("GH_TOKEN", "gh"), ("GITHUB_TOKEN", "github")]);
        assert_eq!(
            resolve_token_with(Some("explicit"), "github.com", &store, &env).as_deref(),
            Some("explicit")
        );
        assert_eq!(
            resolve_token_with(None, "github.com", &store, &env).as_deref(),
            Some("github")
        );
        assert_eq!(
            resolve_token_with(Some("  "), "github.com", &store, env_of(&[])).as_deref(),
            Some("stored")
        );
        assert_eq!(
            resolve_token_with(None, "example.com", &store, env_of(&[])),
            None
        );
    }

    #[test]
    fn test_host_of_api_base() {
        assert_eq!(host_of("https://api.github.com"), "github.com");
        assert_eq!(host_of("https://GHE.corp.example/api/v3"), "ghe.corp.example");
        assert_eq!(host_of("http://localhost:8080/"), "localhost");
    }

    #[test]
    fn test_store_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.toml");

        assert!(TokenStore::load(&path).unwrap().get("github.com").is_none());

        let mut store = TokenStore::default();
        store.set("github.com", "abc");
        store.save(&path).unwrap();

        let loaded = TokenStore::load(&path).unwrap();
        assert_eq!(loaded.get("GITHUB.COM"), Some("abc"));
    }
}
