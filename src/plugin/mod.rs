pub mod host_cli;
pub mod host_config;
pub mod installer;
pub mod manifest;
