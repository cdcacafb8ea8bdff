//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cfgtree/cfgtree.toml`
//! 3. Local config: `<dir>/.cfgtree.toml` (current directory unless given)
//! 4. Environment variables: `CFGTREE_*` prefix, `__` between sections

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DumpStyle;

/// Rendering of tree dumps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DumpSettings {
    /// Glyph shown for enabled nodes
    pub enabled_glyph: String,
    /// Glyph shown for disabled nodes
    pub disabled_glyph: String,
    /// Spaces per tree level
    pub indent: usize,
}

impl Default for DumpSettings {
    fn default() -> Self {
        let style = DumpStyle::default();
        Self {
            enabled_glyph: style.enabled_glyph,
            disabled_glyph: style.disabled_glyph,
            indent: style.indent,
        }
    }
}

impl From<&DumpSettings> for DumpStyle {
    fn from(settings: &DumpSettings) -> Self {
        DumpStyle {
            enabled_glyph: settings.enabled_glyph.clone(),
            disabled_glyph: settings.disabled_glyph.clone(),
            indent: settings.indent,
        }
    }
}

/// Raw dump settings: `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDumpSettings {
    pub enabled_glyph: Option<String>,
    pub disabled_glyph: Option<String>,
    pub indent: Option<usize>,
}

/// Raw settings for intermediate parsing of one config file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub definitions: Option<PathBuf>,
    pub color: Option<bool>,
    pub dump: RawDumpSettings,
}

/// Unified configuration for cfgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Definitions file used when `--file` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<PathBuf>,
    /// Colored terminal output
    pub color: bool,
    /// Dump rendering
    pub dump: DumpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            definitions: None,
            color: true,
            dump: DumpSettings::default(),
        }
    }
}

/// Get the XDG config directory for cfgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cfgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cfgtree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".cfgtree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is kept as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(definitions) = &self.definitions {
            let expanded = expand_env_vars(definitions.to_string_lossy().as_ref());
            self.definitions = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            definitions: overlay
                .definitions
                .clone()
                .or_else(|| self.definitions.clone()),
            color: overlay.color.unwrap_or(self.color),
            dump: DumpSettings {
                enabled_glyph: overlay
                    .dump
                    .enabled_glyph
                    .clone()
                    .unwrap_or_else(|| self.dump.enabled_glyph.clone()),
                disabled_glyph: overlay
                    .dump
                    .disabled_glyph
                    .clone()
                    .unwrap_or_else(|| self.dump.disabled_glyph.clone()),
                indent: overlay.dump.indent.unwrap_or(self.dump.indent),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding `.cfgtree.toml` (default: current directory)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        let local_dir = match local_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().map_err(|e| ApplicationError::Config {
                message: format!("current directory: {e}"),
            })?,
        };
        let local_path = local_config_path(&local_dir);
        if local_path.exists() {
            current = current.merge_with(&load_raw_settings(&local_path)?);
        }

        current = current.apply_env_overrides(Environment::with_prefix("CFGTREE"))?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply CFGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("definitions") {
            self.definitions = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("color") {
            self.color = val;
        }
        if let Ok(val) = config.get_string("dump.enabled_glyph") {
            self.dump.enabled_glyph = val;
        }
        if let Ok(val) = config.get_string("dump.disabled_glyph") {
            self.dump.disabled_glyph = val;
        }
        if let Ok(val) = config.get::<usize>("dump.indent") {
            self.dump.indent = val;
        }

        Ok(self)
    }

    /// Same as the env override step, reading from `vars` instead of the process.
    pub fn with_env_overrides(self, vars: HashMap<String, String>) -> Result<Self, ApplicationError> {
        self.apply_env_overrides(Environment::with_prefix("CFGTREE").source(Some(vars)))
    }

    pub fn dump_style(&self) -> DumpStyle {
        DumpStyle::from(&self.dump)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cfgtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/cfgtree/cfgtree.toml
#   Local:  ./.cfgtree.toml
#   Env:    CFGTREE_* environment variables (CFGTREE_DUMP__INDENT=4)

# Tree definitions used when --file is not given
# definitions = "~/.config/cfgtree/tree.toml"

# Colored output (NO_COLOR is honored as well)
# color = true

[dump]
# enabled_glyph = "✓"
# disabled_glyph = "✗"
# indent = 2
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
