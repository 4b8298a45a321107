//! Configuration management with YAML support

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Defaults applied when a command leaves an option out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_log_limit")]
    pub log_limit: usize,

    #[serde(default = "default_diff_context")]
    pub diff_context: usize,
}

/// Where `checkout` writes when no output file is given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_extension")]
    pub extension: String,
}

// Default value functions
fn default_database_path() -> String {
    "~/.promptvc/prompts.db".to_string()
}

fn default_model() -> String {
    crate::store::DEFAULT_MODEL.to_string()
}

fn default_log_limit() -> usize {
    20
}

fn default_diff_context() -> usize {
    3
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_extension() -> String {
    "txt".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            log_limit: default_log_limit(),
            diff_context: default_diff_context(),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            extension: default_extension(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./promptvc.yaml (current directory)
    /// 3. ~/.config/promptvc/promptvc.yaml
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut search_paths = Vec::with_capacity(3);
        if let Some(path) = path {
            search_paths.push(shellexpand::tilde(path).to_string());
        }
        search_paths.push("promptvc.yaml".to_string());
        search_paths.push(shellexpand::tilde("~/.config/promptvc/promptvc.yaml").to_string());

        for search_path in &search_paths {
            if Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)
                    .with_context(|| format!("reading config {}", search_path))?;
                return Self::from_yaml(&content)
                    .with_context(|| format!("parsing config {}", search_path));
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.path).to_string();
        PathBuf::from(expanded)
    }

    /// Default checkout target for a prompt: `<output_dir>/<prompt>.<extension>`
    ///
    /// The prompt name must be a single plain file name so the target stays
    /// inside `output_dir`.
    pub fn checkout_path(&self, prompt_name: &str) -> StoreResult<PathBuf> {
        if prompt_name.is_empty()
            || prompt_name == "."
            || prompt_name == ".."
            || prompt_name.contains(['/', '\\'])
        {
            return Err(StoreError::validation(format!(
                "prompt name '{}' cannot be used as a checkout file name; pass --output",
                prompt_name
            )));
        }

        let dir = PathBuf::from(shellexpand::tilde(&self.checkout.output_dir).to_string());
        let extension = self.checkout.extension.trim_start_matches('.');
        if extension.is_empty() {
            Ok(dir.join(prompt_name))
        } else {
            Ok(dir.join(format!("{}.{}", prompt_name, extension)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, "~/.promptvc/prompts.db");
        assert_eq!(config.defaults.model, "gpt-4");
        assert_eq!(config.defaults.log_limit, 20);
        assert_eq!(config.defaults.diff_context, 3);
        assert_eq!(config.checkout_path("summarizer").unwrap(), Path::new("./summarizer.txt"));
    }

    #[test]
    fn test_checkout_path_uses_configured_dir_and_extension() {
        let mut config = Config::default();
        config.checkout.output_dir = "prompts".to_string();
        config.checkout.extension = ".md".to_string();
        assert_eq!(config.checkout_path("chatbot").unwrap(), Path::new("prompts/chatbot.md"));

        config.checkout.extension = String::new();
        assert_eq!(config.checkout_path("chatbot").unwrap(), Path::new("prompts/chatbot"));
    }

    #[test]
    fn test_checkout_path_rejects_names_leaving_output_dir() {
        let mut config = Config::default();
        config.checkout.output_dir = "prompts".to_string();
        for name in ["../x", "a/b", "a\\b", "..", ".", "/etc/passwd"] {
            assert!(
                matches!(config.checkout_path(name), Err(StoreError::Validation(_))),
                "{name:?}"
            );
        }

        config.checkout.extension = String::new();
        assert!(config.checkout_path("..").is_err());
        assert_eq!(config.checkout_path("v1..v2").unwrap(), Path::new("prompts/v1..v2"));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
database:
  path: /tmp/promptvc/test.db

defaults:
  model: claude-3
  diff_context: 1

checkout:
  output_dir: out
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/promptvc/test.db"));
        assert_eq!(config.defaults.model, "claude-3");
        assert_eq!(config.defaults.diff_context, 1);
        assert_eq!(config.defaults.log_limit, 20);
        assert_eq!(config.checkout_path("alpha").unwrap(), Path::new("out/alpha.txt"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("database:\n  path: here.db\n").unwrap();
        assert_eq!(config.database.path, "here.db");
        assert_eq!(config.checkout.extension, "txt");
    }
}
