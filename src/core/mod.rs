pub mod app;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod llm;
pub mod models;
pub mod paths;
pub mod recipe;
pub mod store;
