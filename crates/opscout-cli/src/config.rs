//! Configuration for the opscout CLI.
//!
//! Provides the [`OpscoutConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `OPSCOUT_CONFIG` environment variable
//! 3. XDG default: `~/.config/opscout/config.toml`
//! 4. Built-in defaults
//!
//! `OPSCOUT_*` environment variables overlay the loaded values, e.g.
//! `OPSCOUT_CATALOG_PATH` or `OPSCOUT_VECTOR_PROVIDER`.

use confyg::{env, Confygery};
use opscout::RetrievalConfig;
use opscout_core::{Error, Result};
use opscout_vector::VectorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for config overlays.
pub const ENV_PREFIX: &str = "OPSCOUT";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the opscout CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpscoutConfig {
    /// JSON file holding the operator catalog.
    pub catalog_path: Option<String>,

    /// Retrieval tuning.
    pub retrieval: RetrievalConfig,

    /// Embedding provider and persisted index settings.
    pub vector: VectorConfig,
}

// ============================================================================
// Config loading
// ============================================================================

impl OpscoutConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("retrieval");
        env_opts.add_section("vector");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("OPSCOUT_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("opscout").join("config.toml"))
    }

    /// The catalog file, or a config error if none is configured.
    pub fn catalog_path(&self) -> Result<PathBuf> {
        self.catalog_path.as_ref().map(PathBuf::from).ok_or_else(|| {
            Error::config(
                "No operator catalog configured. Set `catalog_path` in the config file \
                 or OPSCOUT_CATALOG_PATH.",
            )
        })
    }

    /// Directory of the persisted semantic index.
    ///
    /// Uses `vector.cache_dir` when set, otherwise the platform cache
    /// directory (`~/.cache/opscout/vector_index` on Linux).
    pub fn index_dir(&self) -> Option<PathBuf> {
        match &self.vector.cache_dir {
            Some(dir) => Some(PathBuf::from(dir)),
            None => dirs::cache_dir().map(|d| d.join("opscout").join("vector_index")),
        }
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `OPSCOUT_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, ENV_PREFIX, &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = OpscoutConfig::default();
        assert!(config.catalog_path.is_none());
        assert_eq!(config.retrieval.max_limit, 30);
        assert_eq!(config.vector.provider, "fastembed");
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            catalog_path = "/data/operators.json"

            [retrieval]
            max_limit = 20
            hybrid_bm25_weight = 0.7

            [vector]
            provider = "mock"
            dimension = 16
            cache_dir = "/data/index"
        "#;

        let config: OpscoutConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.catalog_path.as_deref(), Some("/data/operators.json"));
        assert_eq!(config.retrieval.max_limit, 20);
        assert_eq!(config.retrieval.hybrid_bm25_weight, 0.7);
        assert_eq!(config.retrieval.rrf_k, 60.0);
        assert_eq!(config.vector.provider, "mock");
        assert_eq!(config.index_dir(), Some(PathBuf::from("/data/index")));
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = OpscoutConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[retrieval]"));
        assert!(toml_str.contains("[vector]"));

        let parsed: OpscoutConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                catalog_path = "ops.json"
                [retrieval]
                default_limit = 5
            "#,
        )
        .unwrap();

        let config = OpscoutConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.catalog_path.as_deref(), Some("ops.json"));
        assert_eq!(config.retrieval.default_limit, 5);
    }

    #[test]
    fn test_config_load_missing_file_uses_defaults() {
        let config = OpscoutConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.retrieval.max_limit, 30);
    }

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = OpscoutConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_catalog_path_required() {
        let err = OpscoutConfig::default().catalog_path().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_to_env_vars() {
        let config = OpscoutConfig {
            catalog_path: Some("/ops.json".into()),
            ..Default::default()
        };
        let map: HashMap<_, _> = config.to_env_vars().unwrap().into_iter().collect();
        assert_eq!(map.get("OPSCOUT_CATALOG_PATH").unwrap(), "/ops.json");
        assert_eq!(map.get("OPSCOUT_RETRIEVAL_MAX_LIMIT").unwrap(), "30");
        assert_eq!(map.get("OPSCOUT_VECTOR_PROVIDER").unwrap(), "fastembed");
    }
}
