//! CLI module for cryptic-daemon
//!
//! Provides the command-line interface of the daemon binary.

pub mod docs;
pub mod serve;

use clap::{Parser, Subcommand};

/// Internal HTTP daemon exposing authenticated JSON endpoints
#[derive(Parser, Debug)]
#[command(name = "cryptic-daemon")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    DAEMON_HOST                 Bind address (default: 0.0.0.0)
    DAEMON_PORT                 Listen port (default: 8000)
    DAEMON_DEBUG                Enable test endpoints, allow running without a token
    DAEMON_API_TOKEN            Bearer token required on every request
    DAEMON_LOG_LEVEL            Log level (default: info)
    DAEMON_DATABASE_URL         Database URL (default: sqlite://daemon.db)
    DAEMON_POOL_SIZE            Maximum pooled connections (default: 20)
    DAEMON_POOL_RECYCLE_SECS    Connection lifetime in seconds (default: 300)
    DAEMON_SQL_SHOW_STATEMENTS  Log executed SQL statements
    DAEMON_SQL_CREATE_TABLES    Create tables on startup
    DAEMON_LIST_DISABLED        List disabled collections in /daemon/endpoints
    DAEMON_SENTRY_DSN           Report errors to Sentry
"#)]
pub struct Cli {
    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the daemon
    Serve(serve::ServeArgs),
    /// Generate Markdown documentation for every endpoint collection
    Docs(docs::DocsArgs),
}
