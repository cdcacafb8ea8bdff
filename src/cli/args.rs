//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Hierarchical configuration toggles with coherent enable/disable cascades
#[derive(Parser, Debug)]
#[command(name = "cfgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Tree definitions file (default: `definitions` from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tree with states
    Tree,

    /// Plain indented dump (for diffs and bug reports)
    Dump,

    /// Enable/disable nodes in order and show what the cascade touched
    Set {
        /// Toggles as ID=on|off (also true/false, 1/0)
        #[arg(required = true, value_parser = parse_toggle)]
        toggles: Vec<Toggle>,
        /// Print the resulting states as TOML instead of the tree
        #[arg(long)]
        state: bool,
    },

    /// Print every node's state as flat TOML
    State,

    /// List node ids at a level
    Level {
        /// Level 1 (roots) to 3
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        level: u8,
    },

    /// Validate the definitions file and report orphans
    Check,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

/// One requested state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub id: String,
    pub enabled: bool,
}

/// Parses `ID=on|off`.
pub fn parse_toggle(s: &str) -> Result<Toggle, String> {
    let (id, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected ID=on|off, got '{s}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing node id in '{s}'"));
    }
    let enabled = match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => true,
        "off" | "false" | "0" | "no" => false,
        other => return Err(format!("invalid state '{other}', expected on or off")),
    };
    Ok(Toggle {
        id: id.to_string(),
        enabled,
    })
}
