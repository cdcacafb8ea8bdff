//! Command dispatch

use std::fs;
use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ConfigTree, IoResultExt, TreeDefinition};
use crate::cli::args::{Cli, Commands, ConfigCommands, Toggle};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_dir, global_config_path, local_config_path, Settings};

/// Runs the parsed command. Returns the process exit code on success.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let settings = Settings::load(None)?;
    if !settings.color {
        colored::control::set_override(false);
    }
    debug!(?settings, "settings loaded");

    match &cli.command {
        Some(Commands::Tree) => _tree(cli, &settings),
        Some(Commands::Dump) => _dump(cli, &settings),
        Some(Commands::Set { toggles, state }) => _set(cli, &settings, toggles, *state),
        Some(Commands::State) => _state(cli, &settings),
        Some(Commands::Level { level }) => _level(cli, &settings, *level),
        Some(Commands::Check) => _check(cli, &settings),
        Some(Commands::Config { command }) => _config(command, &settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(crate::exitcode::OK)
        }
        None => Err(CliError::Usage(
            "no command given, see `cfgtree --help`".to_string(),
        )),
    }
}

fn definitions_path(cli: &Cli, settings: &Settings) -> CliResult<PathBuf> {
    cli.file
        .clone()
        .or_else(|| settings.definitions.clone())
        .ok_or(CliError::Application(ApplicationError::NoDefinitions))
}

fn load_tree(cli: &Cli, settings: &Settings) -> CliResult<ConfigTree> {
    let path = definitions_path(cli, settings)?;
    let definition = TreeDefinition::load(&path)?;
    Ok(ConfigTree::from_definition(&definition)?)
}

fn print_tree(tree: &ConfigTree, settings: &Settings) {
    let style = settings.dump_style();
    let forest = tree
        .store()
        .to_tree_strings(|node| output::node_label(&style, node));
    for root in forest {
        output::info(&root);
    }
    let orphans = tree.orphans();
    if !orphans.is_empty() {
        output::warning(&format!(
            "{} orphaned node(s): {}",
            orphans.len(),
            orphans.iter().map(|n| n.id.as_str()).join(", ")
        ));
    }
}

#[instrument(skip_all)]
fn _tree(cli: &Cli, settings: &Settings) -> CliResult<i32> {
    let tree = load_tree(cli, settings)?;
    print_tree(&tree, settings);
    Ok(crate::exitcode::OK)
}

#[instrument(skip_all)]
fn _dump(cli: &Cli, settings: &Settings) -> CliResult<i32> {
    let tree = load_tree(cli, settings)?;
    output::info(&tree.dump_with(&settings.dump_style()));
    Ok(crate::exitcode::OK)
}

#[instrument(skip_all)]
fn _set(cli: &Cli, settings: &Settings, toggles: &[Toggle], state: bool) -> CliResult<i32> {
    let mut tree = load_tree(cli, settings)?;

    let unknown: Vec<&str> = toggles
        .iter()
        .map(|t| t.id.as_str())
        .filter(|id| !tree.store().contains(id))
        .collect();
    if !unknown.is_empty() {
        return Err(CliError::InvalidArgs(format!(
            "unknown node id(s): {}",
            unknown.join(", ")
        )));
    }

    for toggle in toggles {
        let affected = tree.set_enabled(&toggle.id, toggle.enabled);
        output::header(&format!(
            "{} {}",
            toggle.id,
            if toggle.enabled { "on" } else { "off" }
        ));
        for node in &affected {
            output::affected(&node.id, node.enabled, node.changed);
        }
    }

    if state {
        _print_state(&tree)?;
    } else {
        println!();
        print_tree(&tree, settings);
    }
    Ok(crate::exitcode::OK)
}

#[instrument(skip_all)]
fn _state(cli: &Cli, settings: &Settings) -> CliResult<i32> {
    let tree = load_tree(cli, settings)?;
    _print_state(&tree)?;
    Ok(crate::exitcode::OK)
}

fn _print_state(tree: &ConfigTree) -> CliResult<()> {
    let states = toml::to_string(&tree.enabled_states()).map_err(|e| {
        ApplicationError::OperationFailed {
            context: "serialize state".to_string(),
            source: Box::new(e),
        }
    })?;
    output::info(&states.trim_end());
    Ok(())
}

#[instrument(skip_all)]
fn _level(cli: &Cli, settings: &Settings, level: u8) -> CliResult<i32> {
    let tree = load_tree(cli, settings)?;
    for node in tree.nodes_by_level(level) {
        output::info(&node.id);
    }
    Ok(crate::exitcode::OK)
}

#[instrument(skip_all)]
fn _check(cli: &Cli, settings: &Settings) -> CliResult<i32> {
    let path = definitions_path(cli, settings)?;
    let tree = load_tree(cli, settings)?;

    output::success(&format!(
        "{}: {} nodes, {} roots, depth {}",
        path.display(),
        tree.all_nodes().len(),
        tree.root_nodes().len(),
        tree.store().depth()
    ));
    let orphans = tree.orphans();
    if orphans.is_empty() {
        return Ok(crate::exitcode::OK);
    }
    output::warning(&format!("{} orphaned node(s)", orphans.len()));
    for node in orphans {
        output::detail(&format!(
            "{} (parent {} not found)",
            node.id,
            node.parent_id.as_deref().unwrap_or_default()
        ));
    }
    Ok(crate::exitcode::WARNINGS)
}

#[instrument(skip_all)]
fn _config(command: &ConfigCommands, settings: &Settings) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info(&"global: (no config directory)"),
            }
            let cwd = std::env::current_dir().with_path_context("current directory", &PathBuf::from("."))?;
            output::info(&format!("local:  {}", local_config_path(&cwd).display()));
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                let dir = global_config_dir().ok_or_else(|| ApplicationError::Config {
                    message: "no config directory on this platform".to_string(),
                })?;
                fs::create_dir_all(&dir).with_path_context("create config dir", &dir)?;
                dir.join("cfgtree.toml")
            } else {
                let cwd = std::env::current_dir()
                    .with_path_context("current directory", &PathBuf::from("."))?;
                local_config_path(&cwd)
            };
            if path.exists() {
                return Err(ApplicationError::AlreadyExists(path).into());
            }
            fs::write(&path, Settings::template()).with_path_context("write config", &path)?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(crate::exitcode::OK)
}
