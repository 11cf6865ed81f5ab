// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Pulp console CLI - administer a content-repository service from the terminal

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pulp_console::commands::{
    self, distribution::DistributionArgs, package::PackageArgs, publication::PublicationArgs,
    remote::RemoteArgs, repository::RepositoryArgs, task::TaskArgs, user::UserArgs,
    view::ViewTarget, Console, ListArgs, Output,
};
use pulp_console::config;
use pulp_console::types::Section;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pulp-console")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "PULP_CONSOLE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Backend URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Username override
    #[arg(long, global = true)]
    username: Option<String>,

    /// Password override
    #[arg(long, env = "PULP_CONSOLE_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show backend health, versions and workers
    Status,

    /// Manage repositories
    Repository {
        /// Action: list, show, create, update, delete, sync
        action: String,

        /// Repository name
        name: Option<String>,

        /// Content section
        #[arg(short, long, value_enum, default_value = "rpm")]
        section: Section,

        #[command(flatten)]
        args: RepositoryArgs,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Manage remotes
    Remote {
        /// Action: list, show, create, update, delete
        action: String,

        /// Remote name
        name: Option<String>,

        /// Content section
        #[arg(short, long, value_enum, default_value = "rpm")]
        section: Section,

        #[command(flatten)]
        args: RemoteArgs,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Manage distributions
    Distribution {
        /// Action: list, show, create, update, delete
        action: String,

        /// Distribution name
        name: Option<String>,

        /// Content section
        #[arg(short, long, value_enum, default_value = "rpm")]
        section: Section,

        #[command(flatten)]
        args: DistributionArgs,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Manage publications
    Publication {
        /// Action: list, show, create, delete
        action: String,

        /// Publication href
        href: Option<String>,

        /// Content section
        #[arg(short, long, value_enum, default_value = "rpm")]
        section: Section,

        #[command(flatten)]
        args: PublicationArgs,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Browse content units
    Package {
        /// Action: list, show
        action: String,

        /// Content href
        href: Option<String>,

        /// Content section
        #[arg(short, long, value_enum, default_value = "rpm")]
        section: Section,

        #[command(flatten)]
        args: PackageArgs,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Manage users
    User {
        /// Action: list, show, create, update, delete
        action: String,

        /// Username
        username: Option<String>,

        #[command(flatten)]
        args: UserArgs,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Inspect and control background tasks
    Task {
        /// Action: list, show, cancel, wait
        action: String,

        /// Task href
        href: Option<String>,

        #[command(flatten)]
        args: TaskArgs,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Launch interactive TUI
    View {
        /// Collection to browse
        #[arg(value_enum, default_value = "repositories")]
        target: ViewTarget,

        /// Content section
        #[arg(short, long, value_enum, default_value = "rpm")]
        section: Section,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (omit to print all)
        key: Option<String>,

        /// Value to set (omit to get)
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn log_filter(cli: &Cli, configured: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Completions need neither configuration nor logging
    if let Commands::Completions { shell } = &cli.command {
        return commands::completions::run(*shell, &mut Cli::command());
    }

    let loaded = config::load(cli.config.as_deref());
    let log_level = loaded
        .as_ref()
        .map_or_else(|_| "info".to_string(), |c| c.log_level.clone());

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&cli, &log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = loaded?;
    if let Some(base_url) = cli.base_url.clone() {
        settings.base_url = base_url;
    }
    if let Some(username) = cli.username.clone() {
        settings.username = username;
    }
    if let Some(password) = cli.password.clone() {
        settings.password = Some(password);
    }

    if let Commands::Config { key, value } = cli.command {
        return commands::config::run(cli.config.as_deref(), &settings, key, value);
    }

    let output = Output {
        json: cli.json,
        color: !cli.no_color,
    };
    let console = Console::new(settings, output)?;

    // Execute command
    match cli.command {
        Commands::Status => commands::status::run(&console).await,
        Commands::Repository { action, name, section, args, list } => {
            commands::repository::run(&console, &action, section, name, args, list).await
        }
        Commands::Remote { action, name, section, args, list } => {
            commands::remote::run(&console, &action, section, name, args, list).await
        }
        Commands::Distribution { action, name, section, args, list } => {
            commands::distribution::run(&console, &action, section, name, args, list).await
        }
        Commands::Publication { action, href, section, args, list } => {
            commands::publication::run(&console, &action, section, href, args, list).await
        }
        Commands::Package { action, href, section, args, list } => {
            commands::package::run(&console, &action, section, href, args, list).await
        }
        Commands::User { action, username, args, list } => {
            commands::user::run(&console, &action, username, args, list).await
        }
        Commands::Task { action, href, args, list } => {
            commands::task::run(&console, &action, href, args, list).await
        }
        Commands::View { target, section } => commands::view::run(&console, section, target),
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
