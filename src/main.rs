//! # Pantry Recipes - budget recipe CLI
//!
//! Sends the ingredients you have (and optionally a photo) to a Gemini model and
//! prints three quick recipes as Markdown.
//!
//! ## Features
//! - `generate` for recipes from text and/or a JPEG photo
//! - `key` subcommands to store, inspect (masked), test, and clear the API key
//! - Configuration via environment and `.env`

mod cli;
mod core;
mod run;

use clap::Parser;
use dotenv::dotenv;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = cli::Args::parse();
    run::init_logger(&args);
    run::run(args).await;
}
