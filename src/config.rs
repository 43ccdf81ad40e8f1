//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rstree/rstree.toml`
//! 3. Local config: `<dir>/.rstree.toml` (directory of the processed file)
//! 4. Environment variables: `RSTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{TreeError, TreeResult};
use crate::transform::Transformer;

/// Default transform rules applied when a `transform` run passes no flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransformConfig {
    /// `OLD=NEW` replacement pairs, applied in order
    pub replace: Vec<String>,
    /// Regex patterns; matching nodes get deleted
    pub delete_matching: Vec<String>,
    /// Whether deletions promote children (default) or drop whole subtrees
    pub keep_children: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            replace: vec![],
            delete_matching: vec![],
            keep_children: true,
        }
    }
}

/// Display preferences for the `tree` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Annotate every node with its reported line number
    pub show_lines: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { show_lines: false }
    }
}

/// Raw transform config for intermediate parsing (fields are Option to
/// distinguish "not specified" from an explicit empty list).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTransformConfig {
    pub replace: Option<Vec<String>>,
    pub delete_matching: Option<Vec<String>>,
    pub keep_children: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_lines: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    #[serde(default)]
    pub transform: RawTransformConfig,
    #[serde(default)]
    pub display: RawDisplayConfig,
}

/// Unified configuration for rstree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Default transform rules
    pub transform: TransformConfig,
    /// Display preferences
    pub display: DisplayConfig,
}

/// Get the XDG config directory for rstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rstree.toml"))
}

/// Get the path to the local config file next to a processed source file.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rstree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> TreeResult<RawSettings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| TreeError::Config(format!("read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| TreeError::Config(format!("parse {}: {}", path.display(), e)))
}

impl Settings {
    /// Merge overlay config onto self (base): a field specified in the
    /// overlay replaces the base value, unspecified fields are inherited.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            transform: TransformConfig {
                replace: overlay
                    .transform
                    .replace
                    .clone()
                    .unwrap_or_else(|| self.transform.replace.clone()),
                delete_matching: overlay
                    .transform
                    .delete_matching
                    .clone()
                    .unwrap_or_else(|| self.transform.delete_matching.clone()),
                keep_children: overlay
                    .transform
                    .keep_children
                    .unwrap_or(self.transform.keep_children),
            },
            display: DisplayConfig {
                show_lines: overlay.display.show_lines.unwrap_or(self.display.show_lines),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a local `.rstree.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/rstree/rstree.toml`
    /// 3. Local config: `<local_dir>/.rstree.toml`
    /// 4. Environment variables: `RSTREE_*` prefix
    pub fn load(local_dir: Option<&Path>) -> TreeResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Apply RSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> TreeResult<Self> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("RSTREE")
                .separator("__")
                .list_separator(","),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<Vec<String>>("transform.replace") {
            settings.transform.replace = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("transform.delete_matching") {
            settings.transform.delete_matching = val;
        }
        if let Ok(val) = config.get_bool("transform.keep_children") {
            settings.transform.keep_children = val;
        }
        if let Ok(val) = config.get_bool("display.show_lines") {
            settings.display.show_lines = val;
        }

        Ok(settings)
    }

    /// Build the configured default transformer from the rule specs.
    pub fn transform_rules(&self) -> TreeResult<Transformer> {
        Transformer::from_specs(
            &self.transform.replace,
            &self.transform.delete_matching,
            self.transform.keep_children,
        )
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> TreeResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TreeError::Config(format!("serialize config: {e}")))
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# rstree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rstree/rstree.toml
#   Local:  <dir>/.rstree.toml          (next to the processed file)
#   Env:    RSTREE_* environment variables

[transform]
# OLD=NEW replacement pairs, applied in order
# replace = ["staging=production"]

# Regex patterns; nodes with matching text get deleted
# delete_matching = ["# TODO"]

# Deletions promote children by default; set false to drop whole subtrees
# keep_children = true

[display]
# Annotate tree nodes with their reported line numbers
# show_lines = false
"##
        .to_string()
    }
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load(None).expect("load defaults");
        assert!(settings.transform.keep_children);
        assert!(settings.transform.replace.is_empty());
    }

    #[test]
    fn given_overlay_with_replace_when_merging_then_overlay_wins() {
        let base = Settings::default();
        let overlay = RawSettings {
            transform: RawTransformConfig {
                replace: Some(vec!["a=b".to_string()]),
                delete_matching: None,
                keep_children: Some(false),
            },
            display: RawDisplayConfig { show_lines: None },
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.transform.replace, vec!["a=b".to_string()]);
        assert!(merged.transform.delete_matching.is_empty());
        assert!(!merged.transform.keep_children);
        assert!(!merged.display.show_lines);
    }

    #[test]
    fn given_unspecified_overlay_when_merging_then_base_is_kept() {
        let mut base = Settings::default();
        base.transform.delete_matching = vec!["TODO".to_string()];
        let overlay = RawSettings::default();

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.transform.delete_matching, vec!["TODO".to_string()]);
        assert!(merged.transform.keep_children);
    }

    #[test]
    fn given_default_settings_when_building_rules_then_transformer_is_empty() {
        let settings = Settings::default();
        let transformer = settings.transform_rules().expect("build rules");
        assert!(transformer.is_empty());
    }

    #[test]
    fn given_template_when_parsed_then_it_is_valid_toml() {
        let template = Settings::template();
        let raw: RawSettings = toml::from_str(&template).expect("parse template");
        assert!(raw.transform.replace.is_none());
    }

    #[test]
    fn given_template_when_inspected_then_every_section_is_present() {
        // The delete_matching example embeds a quote-hash sequence; make sure
        // the literal carries the full text through to the display section.
        let template = Settings::template();
        assert!(template.contains("# delete_matching = [\"# TODO\"]"));
        assert!(template.contains("[display]"));
        assert!(template.contains("# show_lines = false"));
    }
}
