//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod chemical;
pub mod user;

// Re-export specific types to avoid conflicts
pub use chemical::{Column as ChemicalColumn, Entity as Chemical, Model as ChemicalModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
