//! Configuration and CLI argument handling

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::persistence::paths;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "atg-workout")]
#[command(about = "A state-managed HTTP server that tracks progress through a workout routine")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the saved session (defaults to the user data directory)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Routine definition JSON file (defaults to the built-in routine)
    #[arg(short, long)]
    pub routine: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolve the data directory, falling back to the platform default
    pub fn resolve_data_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::data_dir().context("Could not determine a data directory, pass --data-dir"),
        }
    }
}
