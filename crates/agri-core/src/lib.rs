pub mod chat;
pub mod config;
mod config_env;
pub mod fixtures;
pub mod image;
pub mod llm;
pub mod models;
pub mod navigation;
pub mod screen;
