//! User entity - Login accounts for the inventory frontend.
//!
//! Passwords are never stored in clear text; `password_hash` holds an
//! Argon2 PHC string with its own salt.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Login name
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC-formatted hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the password was last changed
    pub updated_at: DateTimeUtc,
}

/// `User` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
