//! CLI commands for the `tailor theme` namespace.
//!
//! Provides subcommands for maintaining the installed theme set:
//! - `list`: Show installed themes, marking the default
//! - `add`: Record a newly installed theme
//! - `default`: Switch the default theme

use crate::display::{colors, paint, print_success};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use tailor_core::Config;

/// Theme management commands.
#[derive(Parser, Debug)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: ThemeCommands,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// List installed themes
    List,

    /// Record an installed theme
    Add(AddArgs),

    /// Set the default theme
    Default(DefaultArgs),
}

/// Arguments for the `theme add` command.
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Theme identifier (e.g. "even", "stackoverflow")
    pub theme: String,

    /// Also make it the default theme
    #[arg(long)]
    pub default: bool,
}

/// Arguments for the `theme default` command.
#[derive(Parser, Debug)]
pub struct DefaultArgs {
    /// Installed theme identifier
    pub theme: String,
}

/// Execute a theme command against the config at `config_path`.
pub fn execute(args: ThemeArgs, config_path: &Path, use_colors: bool) -> Result<()> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    match args.command {
        ThemeCommands::List => {
            for line in format_theme_list(&config, use_colors) {
                println!("{line}");
            }
            Ok(())
        }
        ThemeCommands::Add(add) => {
            config.add_theme(add.theme.as_str())?;
            if add.default {
                config.set_default_theme(&add.theme)?;
            }
            config.save(config_path)?;
            print_success(&format!("Added theme '{}'", add.theme), use_colors);
            Ok(())
        }
        ThemeCommands::Default(default) => {
            config.set_default_theme(&default.theme)?;
            config.save(config_path)?;
            print_success(
                &format!("Default theme is now '{}'", default.theme),
                use_colors,
            );
            Ok(())
        }
    }
}

fn format_theme_list(config: &Config, use_colors: bool) -> Vec<String> {
    config
        .themes
        .iter()
        .map(|theme| {
            if *theme == config.default_theme {
                format!("* {}", paint(theme, colors::GREEN, use_colors))
            } else {
                format!("  {theme}")
            }
        })
        .collect()
}
