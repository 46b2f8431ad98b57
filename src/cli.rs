use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AI code assistant client
#[derive(Debug, Parser)]
#[command(name = "codexplain")]
#[command(version)]
#[command(about = "Explain, refactor, and generate tests for code via the assistant API", long_about = None)]
pub struct Args {
    /// API base URL (default: CODEXPLAIN_API_URL, config api_url, or http://localhost:8000)
    #[arg(long = "api-url")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Explain what a piece of code does
    Explain {
        /// File to read code from; stdin (or the saved session) when omitted
        file: Option<PathBuf>,

        /// Programming language hint
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Suggest a refactored version of the code
    Refactor {
        /// File to read code from; stdin (or the saved session) when omitted
        file: Option<PathBuf>,

        /// Programming language hint
        #[arg(short, long)]
        language: Option<String>,

        /// What the refactor should aim for (e.g. "readability")
        #[arg(short, long)]
        goal: Option<String>,
    },

    /// Generate unit tests for the code
    Tests {
        /// File to read code from; stdin (or the saved session) when omitted
        file: Option<PathBuf>,

        /// Programming language hint
        #[arg(short, long)]
        language: Option<String>,

        /// Test framework to target (e.g. "pytest")
        #[arg(short = 'f', long = "framework")]
        test_framework: Option<String>,
    },

    /// Query the API health endpoint
    Health,

    /// Legacy liveness probe
    Ping,

    /// Clear the saved editor session
    Reset,
}
