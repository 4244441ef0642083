use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the pblog binary.
#[derive(Debug, Parser)]
#[command(name = "pblog", version, about = "pblog blog server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PBLOG_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the blog HTTP server.
    Serve(Box<ServeArgs>),
    /// Apply migrations and create the configured blog if it does not exist.
    Create(CreateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the absolute base URL used in feeds.
    #[arg(long = "public-url", value_name = "URL")]
    pub public_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the name of the blog to serve.
    #[arg(long = "blog-name", value_name = "NAME")]
    pub blog_name: Option<String>,

    /// Override the directory served under `/static`.
    #[arg(long = "static-directory", value_name = "PATH")]
    pub static_directory: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CreateArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Name of the blog to create.
    #[arg(long = "blog-name", value_name = "NAME")]
    pub blog_name: Option<String>,

    /// Initial admin password.
    #[arg(long = "password", env = "PBLOG_BOOTSTRAP_PASSWORD", value_name = "PASSWORD")]
    pub password: Option<String>,
}
