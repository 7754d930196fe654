use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `rollup-llm` - rollup co-processor that answers advance requests with an LLM.
#[derive(Parser, Debug)]
#[command(name = "rollup-llm")]
#[command(version)]
#[command(about = "Poll a rollup coordinator and answer advance requests with LLM inference.", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the per-user config, then built-in defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the rollup poll loop
    Run,

    /// Serve the GIO bridge (`/v1/chat/completions` tunnelled to the coordinator)
    ServeGio {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the resolved configuration
    Status,
}
