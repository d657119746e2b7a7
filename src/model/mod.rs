pub mod config;
pub mod credential;
pub mod settings;
pub mod stage;
