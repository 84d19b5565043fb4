//! Application run modes: logger init, manager construction, command dispatch.

use std::io;

use clap::CommandFactory;

use crate::cli::{Args, Commands, KeySubcommand, generate};
use crate::core;
use crate::core::config::Config;
use crate::core::credentials::CredentialManager;
use crate::core::llm::GeminiFactory;

/// Initialize env_logger on stderr. `RUST_LOG` wins over -v/-q.
pub fn init_logger(args: &Args) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level()),
    )
    .target(env_logger::Target::Stderr)
    .try_init();
}

/// Build the process-wide manager from configuration. Exits on an unusable store.
pub fn build_manager(config: &Config) -> CredentialManager {
    let store = config.open_store().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let factory = GeminiFactory::new(config.base_url.clone());
    CredentialManager::new(store, Box::new(factory), &config.base_model_id)
}

/// Dispatch the parsed command.
pub async fn run(args: Args) {
    if let Commands::Completions { shell } = &args.command {
        let mut cmd = Args::command();
        generate(*shell, &mut cmd, core::app::NAME, &mut io::stdout());
        return;
    }

    let model_override = args.model.as_deref();
    let config = core::cli::load_config(model_override);
    log::debug!(
        "config: model={} endpoint={} store={:?}",
        config.model_id,
        config.base_url,
        config.store
    );

    if let Commands::Models = &args.command {
        core::cli::run_models(&config);
        return;
    }

    let mut manager = build_manager(&config);
    manager.initialize().await;
    if let Some(model) = model_override
        && let Err(e) = manager.set_model(model)
    {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    match &args.command {
        Commands::Generate { ingredients, image } => {
            core::cli::run_generate(&mut manager, ingredients, image.as_deref()).await
        }
        Commands::Key { subcommand } => match subcommand {
            KeySubcommand::Set { key } => core::cli::run_key_set(&mut manager, key.clone()).await,
            KeySubcommand::Show => core::cli::run_key_show(&manager),
            KeySubcommand::Clear => core::cli::run_key_clear(&mut manager).await,
            KeySubcommand::Test => core::cli::run_key_test(&mut manager).await,
        },
        Commands::Config => core::cli::run_config(&config, &manager, model_override),
        Commands::Models | Commands::Completions { .. } => {}
    }
}
