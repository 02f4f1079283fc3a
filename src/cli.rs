use clap::{Parser, Subcommand};

/// Job application tracking API
#[derive(Parser)]
#[command(name = "job-tracker", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply pending database migrations and exit
    Migrate,
}
