//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  pantry-recipes key set                       Read API key from stdin and store it
  pantry-recipes key test                      Check the stored key against the model
  pantry-recipes generate \"rice, eggs, leek\"   Three quick recipes as Markdown
  pantry-recipes generate - < fridge.txt       Read ingredients from stdin
  pantry-recipes generate \"tomato\" -i a.jpg    Include a photo of the ingredients
  pantry-recipes models                        List candidate models
  pantry-recipes config                        Show config paths and key status
  pantry-recipes completions bash              Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Quick budget recipes from the ingredients you have, powered by Gemini",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the model (bare name or models/<name>)
    #[arg(short = 'm', long, global = true, help = "Model name (e.g. gemini-1.5-pro)")]
    pub model: Option<String>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Suggest three 15-minute recipes for the given ingredients
    Generate {
        /// Ingredients, comma separated ('-' reads from stdin)
        ingredients: String,
        /// Photo of the ingredients (sent as JPEG)
        #[arg(short = 'i', long)]
        image: Option<PathBuf>,
    },
    /// Manage the stored Gemini API key
    Key {
        #[command(subcommand)]
        subcommand: KeySubcommand,
    },
    /// List candidate models
    Models,
    /// Show config paths, model, and API key status
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum KeySubcommand {
    /// Store the API key (reads stdin when KEY is omitted)
    Set { key: Option<String> },
    /// Show the stored key in masked form
    Show,
    /// Remove the stored key
    Clear,
    /// Send a short test request with the stored key
    Test,
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
