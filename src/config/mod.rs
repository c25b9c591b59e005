/// Database configuration and connection management
pub mod database;

/// Server configuration loading from config.toml
pub mod server;

/// Admin account configuration from environment variables
pub mod users;
