// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

mod activation;
mod commands;
mod config;
mod db;
mod error;
mod export;
mod providers;
mod settings;
mod shell;
mod tui;

#[derive(Parser, Debug)]
#[command(
    name = "envswap",
    version,
    about = "Switch between named environment variable profiles without restarting your shell",
    after_help = "Run without a subcommand to pick a profile interactively.\n\
                  Set it up once with: eval \"$(envswap init bash)\""
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the statements that activate a profile (evaluated by the shell function)
    Use {
        /// Profile to activate. If omitted, an interactive picker lets you choose one.
        name: Option<String>,

        /// Shell dialect to emit: bash, zsh, sh or fish
        #[arg(short, long, env = "ENVSWAP_SHELL")]
        shell: Option<String>,

        /// Print the statements without recording the profile as active
        #[arg(long)]
        dry_run: bool,
    },

    /// Unset every variable the active profile set
    Deactivate {
        /// Shell dialect to emit: bash, zsh, sh or fish
        #[arg(short, long, env = "ENVSWAP_SHELL")]
        shell: Option<String>,

        /// Print the statements without forgetting the active profile
        #[arg(long)]
        dry_run: bool,
    },

    /// List profiles in the order they were created
    List {
        /// Print bare names only
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the variables of a profile
    Show { name: String },

    /// Print the name of the active profile, if any
    Current,

    /// Create a new profile
    Create {
        name: String,

        /// Initial assignments
        #[arg(value_name = "VAR=VALUE")]
        assignments: Vec<String>,
    },

    /// Set variables in a profile, creating it if needed
    Set {
        name: String,

        #[arg(value_name = "VAR=VALUE", required = true)]
        assignments: Vec<String>,
    },

    /// Remove variables from a profile
    Unset {
        name: String,

        #[arg(value_name = "VAR", required = true)]
        vars: Vec<String>,
    },

    /// Delete a profile
    Delete { name: String },

    /// Create one profile per AWS profile, docker context or installed tool version
    Import {
        #[arg(value_enum)]
        provider: providers::Provider,

        /// Read from this file or directory instead of the tool's default location
        #[arg(long, value_name = "PATH")]
        from: Option<PathBuf>,
    },

    /// Print the shell integration snippet for your startup file
    Init {
        /// bash, zsh, sh or fish
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("ENVSWAP_LOG", "warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let mut out = io::stdout().lock();

    if let Some(Commands::Init { shell }) = &cli.command {
        // Needs no store or settings.
        return commands::init(shell, &mut out);
    }

    let ctx = commands::Context::from_env()?;
    match cli.command {
        Some(Commands::Use {
            name,
            shell,
            dry_run,
        }) => commands::use_profile(&ctx, name.as_deref(), shell.as_deref(), dry_run, &mut out),
        Some(Commands::Deactivate { shell, dry_run }) => {
            commands::deactivate(&ctx, shell.as_deref(), dry_run, &mut out)
        }
        Some(Commands::List { quiet }) => commands::list(&ctx, quiet, &mut out),
        Some(Commands::Show { name }) => commands::show(&ctx, &name, &mut out),
        Some(Commands::Current) => commands::current(&ctx, &mut out),
        Some(Commands::Create { name, assignments }) => {
            commands::create(&ctx, &name, &assignments)
        }
        Some(Commands::Set { name, assignments }) => {
            commands::set_vars(&ctx, &name, &assignments)
        }
        Some(Commands::Unset { name, vars }) => commands::unset_vars(&ctx, &name, &vars),
        Some(Commands::Delete { name }) => commands::delete(&ctx, &name),
        Some(Commands::Import { provider, from }) => {
            commands::import(&ctx, provider, from.as_deref())
        }
        Some(Commands::Init { shell }) => commands::init(&shell, &mut out),
        None => {
            // If no subcommand is provided, pick a profile interactively.
            let shell = std::env::var("ENVSWAP_SHELL").ok();
            commands::use_profile(&ctx, None, shell.as_deref(), false, &mut out)
        }
    }
}
