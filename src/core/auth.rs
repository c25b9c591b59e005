//! Login accounts - password hashing, login and password changes.
//!
//! Passwords are stored as salted Argon2 hashes. A successful login returns
//! an opaque random token for the frontend to keep; no route checks it.

use crate::{
    config::users::AdminCredentials,
    entities::{User, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{Set, prelude::*};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Hashes a clear-text password with a fresh random salt.
///
/// # Errors
/// Returns `Error::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Checks a clear-text password against a stored PHC hash.
///
/// # Errors
/// Returns `Error::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn validate_new_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(Error::Validation {
            message: "Password cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Finds a user by login name.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a user with a hashed password.
///
/// # Errors
/// Returns an error if the username or password is blank, hashing fails,
/// or the insert fails (for example on a taken username).
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::Validation {
            message: "Username cannot be empty".to_string(),
        });
    }
    validate_new_password(password)?;

    let user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)?),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    user.insert(db).await.map_err(Into::into)
}

/// Creates the configured admin account unless it already exists.
///
/// Returns `true` when a new account was created.
#[instrument(skip(db, credentials), fields(username = %credentials.username))]
pub async fn ensure_admin_user(
    db: &DatabaseConnection,
    credentials: &AdminCredentials,
) -> Result<bool> {
    if get_user_by_username(db, &credentials.username)
        .await?
        .is_some()
    {
        return Ok(false);
    }
    create_user(db, &credentials.username, &credentials.password).await?;
    info!("Seeded admin account");
    Ok(true)
}

/// Checks credentials and returns a session token.
///
/// # Errors
/// Returns `Error::InvalidCredentials` when the user is unknown or the
/// password does not match.
#[instrument(skip(db, password))]
pub async fn login(db: &DatabaseConnection, username: &str, password: &str) -> Result<String> {
    let Some(user) = get_user_by_username(db, username.trim()).await? else {
        warn!("Login attempt for unknown user");
        return Err(Error::InvalidCredentials);
    };
    if !verify_password(password, &user.password_hash)? {
        warn!("Login attempt with wrong password");
        return Err(Error::InvalidCredentials);
    }
    Ok(Uuid::new_v4().to_string())
}

/// Replaces a user's password after checking the current one.
///
/// # Errors
/// Returns an error if:
/// - The current credentials are wrong
/// - The new password is blank
/// - The database update fails
#[instrument(skip(db, current_password, new_password))]
pub async fn change_password(
    db: &DatabaseConnection,
    username: &str,
    current_password: &str,
    new_password: &str,
) -> Result<()> {
    validate_new_password(new_password)?;

    let user = get_user_by_username(db, username.trim())
        .await?
        .ok_or(Error::InvalidCredentials)?;
    if !verify_password(current_password, &user.password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    let mut user: user::ActiveModel = user.into();
    user.password_hash = Set(hash_password(new_password)?);
    user.updated_at = Set(chrono::Utc::now());
    user.update(db).await?;

    info!("Password changed");
    Ok(())
}
