// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use tk_core::Filter;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  tick add \"Buy milk\"     Create an item
  tick list               List all items
  tick toggle <id>        Mark an item done (or not done)
  tick watch              Follow live changes and type commands";

#[derive(Parser, Debug)]
#[command(name = "tick")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A shared to-do list client with live sync")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Path to a config file (default: $TICK_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server base URL, overriding the config file
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List items
    #[command(after_help = "Examples:\n  \
        tick list                    All items, newest first\n  \
        tick list --filter active    Only items still to do\n  \
        tick list -o json            Machine-readable output")]
    List {
        /// Which items to show: all, active, completed
        #[arg(long, short, default_value_t = Filter::All)]
        filter: Filter,

        #[arg(long = "output", short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Add an item
    #[command(arg_required_else_help = true)]
    Add {
        /// Item title
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        title: String,

        #[arg(long = "output", short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Flip an item between done and not done
    #[command(arg_required_else_help = true)]
    Toggle {
        /// Item ID
        id: i64,
    },

    /// Delete an item
    #[command(arg_required_else_help = true)]
    Rm {
        /// Item ID
        id: i64,
    },

    /// Show item counts
    Stats {
        #[arg(long = "output", short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Follow live changes and accept commands on stdin
    #[command(after_help = "Commands (one per line):\n  \
        add <title>     Add an item\n  \
        toggle <id>     Flip an item\n  \
        rm <id>         Delete an item\n  \
        filter <f>      Show all, active or completed\n  \
        retry           Reload after an error\n  \
        dismiss         Clear an error without reloading\n  \
        quit            Exit")]
    Watch {
        /// Initial filter: all, active, completed
        #[arg(long, short, default_value_t = Filter::All)]
        filter: Filter,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
