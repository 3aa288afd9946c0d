use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "docflow", about = "Upload a document and follow its processing")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL, overrides the config file.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Explicit config file instead of ~/.docflow/config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct UploadArgs {
    /// Document to submit.
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub scenario: Option<String>,

    /// AI provider used by the server (openai or jayflow).
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct StatusArgs {
    pub task_id: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a document and watch it until it finishes.
    Upload(UploadArgs),
    /// Follow a task left running by a previous invocation.
    Resume,
    /// Ask the server to cancel the task left running by a previous invocation.
    Cancel,
    /// Print the server status of a task once.
    Status(StatusArgs),
}
