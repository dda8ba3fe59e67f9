//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

/// User Directory - HTTP service for user records
#[derive(Parser, Debug)]
#[command(name = "user-directory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST, env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, env = "SERVER_PORT")]
    pub port: u16,

    /// Keep users in process memory instead of the database
    #[arg(long)]
    pub in_memory: bool,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["user-directory", "serve"]).unwrap();

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, DEFAULT_SERVER_PORT);
                assert!(!args.in_memory);
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn serve_in_memory_with_port() {
        let cli =
            Cli::try_parse_from(["user-directory", "-v", "serve", "--in-memory", "-p", "9001"])
                .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, 9001);
                assert!(args.in_memory);
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn migrate_actions_parse() {
        let cli = Cli::try_parse_from(["user-directory", "migrate", "status"]).unwrap();

        match cli.command {
            Commands::Migrate(args) => assert_eq!(args.action, MigrateAction::Status),
            other => panic!("expected migrate, got {:?}", other),
        }
    }
}
