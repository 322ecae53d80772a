/// Acting user resolved from environment variables
pub mod actor;

/// Database configuration and connection management
pub mod database;

/// Application settings and building seeds loaded from the TOML config file
pub mod settings;
