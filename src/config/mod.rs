/// Database configuration and connection management
pub mod database;

/// Application settings and staff roster loading from config.toml
pub mod settings;
