//! Build script: validates models.json at compile time.

use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "models.json"].iter().collect();
    println!("cargo:rerun-if-changed={}", config_path.display());

    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. models.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    #[derive(serde::Deserialize)]
    struct ModelsFile {
        default_index: usize,
        candidates: Vec<String>,
    }
    let file: ModelsFile = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "models.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
    if file.candidates.is_empty() {
        panic!("models.json must list at least one candidate model");
    }
    if file.default_index >= file.candidates.len() {
        panic!(
            "models.json default_index {} is out of range ({} candidates)",
            file.default_index,
            file.candidates.len()
        );
    }
    if let Some(pos) = file.candidates.iter().position(|c| c.trim().is_empty()) {
        panic!("models.json candidate {} is blank", pos);
    }
}
