//! Command implementations: key management, recipe generation, config and models info.
//!
//! Each command prints plain text; failures print `Error: ...` to stderr and exit 1.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::core::config::{self, Config};
use crate::core::credentials::CredentialManager;
use crate::core::models::{self, normalize_model_name};
use crate::core::paths;
use crate::core::recipe::{self, RecipeRequest};

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn read_stdin() -> String {
    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        fail(format!("reading from stdin: {}", e));
    }
    buf
}

/// Run `generate`: print the recipe markdown to stdout.
pub async fn run_generate(manager: &mut CredentialManager, ingredients: &str, image: Option<&Path>) {
    let ingredients = if ingredients == "-" {
        read_stdin()
    } else {
        ingredients.to_string()
    };

    let mut request = RecipeRequest::new(ingredients);
    if let Some(path) = image {
        let bytes = fs::read(path)
            .unwrap_or_else(|e| fail(format!("reading image {}: {}", path.display(), e)));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        request = request.with_image(bytes, name);
    }

    match recipe::generate_recipe(manager, &request).await {
        Ok(markdown) => println!("{}", markdown),
        Err(e) => fail(e),
    }
}

/// Run `key set`: store the key from the argument or stdin.
pub async fn run_key_set(manager: &mut CredentialManager, key: Option<String>) {
    let key = key.unwrap_or_else(read_stdin);
    if let Err(e) = manager.save_credential(&key).await {
        fail(e);
    }
    println!(
        "API key saved ({}) to {}",
        manager.masked_credential().unwrap_or_default(),
        manager.store().describe()
    );
}

/// Run `key show`: masked key or "not set".
pub fn run_key_show(manager: &CredentialManager) {
    match manager.masked_credential() {
        Some(masked) => println!("{}", masked),
        None => println!("not set"),
    }
}

/// Run `key clear`.
pub async fn run_key_clear(manager: &mut CredentialManager) {
    manager.clear_credential().await;
    println!("API key cleared");
}

/// Run `key test`: exit 1 when the model does not answer.
pub async fn run_key_test(manager: &mut CredentialManager) {
    if manager.masked_credential().is_none() {
        fail("No API key configured. Run `pantry-recipes key set` first.");
    }
    if manager.test_connection().await {
        println!("Connection OK ({})", manager.model());
    } else {
        fail(format!(
            "connection test failed for model {} (run with -v for details)",
            manager.model()
        ));
    }
}

/// Run `models`: list candidates, marking the default and the active model.
pub fn run_models(config: &Config) {
    let selection = models::selection();
    for (i, candidate) in selection.candidates().iter().enumerate() {
        let name = normalize_model_name(candidate);
        let mut marks = Vec::new();
        if i == selection.default_index() {
            marks.push("default");
        }
        if name == config.model_id {
            marks.push("active");
        }
        if marks.is_empty() {
            println!("{}", name);
        } else {
            println!("{}  ({})", name, marks.join(", "));
        }
    }
    if !selection
        .candidates()
        .iter()
        .any(|c| normalize_model_name(c) == config.model_id)
    {
        println!("{}  (active, not a listed candidate)", config.model_id);
    }
}

/// Run `config`: display paths, store, model, and key status.
pub fn run_config(config: &Config, manager: &CredentialManager, model_override: Option<&str>) {
    let config_dir = display_path(paths::config_dir().as_deref());
    let key_status = match manager.masked_credential() {
        Some(masked) if manager.is_ready() => format!("{} ✓", masked),
        Some(masked) => format!("{} (client unavailable)", masked),
        None => "not set".to_string(),
    };

    println!("Config:   {}", config_dir);
    println!("Storage:  {}", manager.store().describe());
    println!(
        "Model:    {} ({})",
        manager.model(),
        Config::model_source(model_override)
    );
    println!("Endpoint: {}", config.base_url);
    println!("API key:  {}", key_status);
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

/// Load configuration or exit with a readable message.
pub fn load_config(model_override: Option<&str>) -> Config {
    config::load(model_override).unwrap_or_else(|e| fail(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_placeholder_is_ascii() {
        assert_eq!(display_path(None), "(none)");
        assert!(display_path(None).is_ascii());
        assert_eq!(display_path(Some(Path::new("/tmp/x"))), "/tmp/x");
    }
}
