//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::{DumpStyle, Node};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data/TOML)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Node label with the state glyph colored: green on, dimmed off
pub fn node_label(style: &DumpStyle, node: &Node) -> String {
    let glyph = style.glyph(node);
    let glyph = if node.is_enabled() {
        glyph.green().to_string()
    } else {
        glyph.dimmed().to_string()
    };
    format!("{} {} {}", glyph, format!("[L{}]", node.level).dimmed(), node.name)
}

/// One line of `set` output, changed nodes marked with `*`
pub fn affected(id: &str, enabled: bool, changed: bool) {
    let state = if enabled { "on".green() } else { "off".red() };
    let marker = if changed { "*".yellow() } else { " ".normal() };
    println!("  {} {} {}", marker, id, state);
}
