//! Configuration file loading for the command-line tool.

use chess_core::Variant;
use game_tree::GameTree;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings read from `pgn-tree.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CliConfig {
    /// Variant of games without a `Variant` tag and of merge targets.
    /// Defaults to standard chess.
    #[serde(default)]
    pub default_variant: Variant,
    /// Indent JSON output.
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
    /// Tags added to exported games that do not set them.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_pretty_json() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            default_variant: Variant::default(),
            pretty_json: default_pretty_json(),
            headers: BTreeMap::new(),
        }
    }
}

impl CliConfig {
    /// Loads the configuration from `pgn-tree.toml` in the working directory.
    ///
    /// A missing file gives the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from("pgn-tree.toml")
    }

    /// Fills in configured tags the tree does not already carry.
    pub fn apply_headers(&self, tree: &mut GameTree) {
        for (tag, value) in &self.headers {
            if tree.header(tag, "").is_empty() {
                tree.set_header(tag.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config: CliConfig = toml::from_str(
            r#"
default_variant = "atomic"
pretty_json = false

[headers]
Site = "Ghent"
Annotator = "pgn-tree"
"#,
        )
        .unwrap();
        assert_eq!(config.default_variant, Variant::Atomic);
        assert!(!config.pretty_json);
        assert_eq!(config.headers.get("Site").map(String::as_str), Some("Ghent"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(config.pretty_json);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("pgn-tree-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pgn-tree.toml");
        std::fs::write(&path, "pretty_json = [").unwrap();
        assert!(matches!(CliConfig::load_from(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = CliConfig::load_from(Path::new("/nonexistent/pgn-tree.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn default_variant_reads_untagged_games() {
        let config: CliConfig = toml::from_str(r#"default_variant = "atomic""#).unwrap();
        let mut tree = GameTree::with_variant(config.default_variant, None);
        tree.parse_pgn_with_variant("1. Nf3 f6 2. Ng5", config.default_variant)
            .unwrap();
        assert_eq!(tree.variant(), Variant::Atomic);
        assert_eq!(tree.current().id(), "*_Nf3_f6_Ng5");
    }

    #[test]
    fn apply_headers_keeps_existing_tags() {
        let mut config = CliConfig::default();
        config.headers.insert("Site".to_string(), "Ghent".to_string());
        config.headers.insert("White".to_string(), "Nobody".to_string());

        let mut tree = GameTree::new();
        tree.set_header("White", "Alice");
        config.apply_headers(&mut tree);
        assert_eq!(tree.header("Site", "?"), "Ghent");
        assert_eq!(tree.header("White", "?"), "Alice");
    }
}
