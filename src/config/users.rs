//! Admin account configuration from environment variables.
//!
//! On start the service makes sure a login exists. The username and initial
//! password come from `INVENTORY_ADMIN_USERNAME` and `INVENTORY_ADMIN_PASSWORD`
//! in the `.env` file; nothing is seeded when the password is not set.

/// Username used when `INVENTORY_ADMIN_USERNAME` is not set.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Credentials for the account seeded on first start.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    /// Login name
    pub username: String,
    /// Initial clear-text password, hashed before storage
    pub password: String,
}

/// Reads the admin credentials from the environment.
///
/// Returns `None` when no password is configured.
#[must_use]
pub fn get_admin_credentials() -> Option<AdminCredentials> {
    let password = std::env::var("INVENTORY_ADMIN_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())?;
    let username = std::env::var("INVENTORY_ADMIN_USERNAME")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());

    Some(AdminCredentials { username, password })
}
