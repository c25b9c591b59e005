//! Core business logic - framework-agnostic stock, record, filtering and
//! purchase-order operations.

/// Login accounts and password hashing
pub mod auth;
/// Chemical record store
pub mod chemical;
/// In-memory filtering for the listing page
pub mod filter;
/// Lenient parsing of form input
pub mod form;
/// Derived stock quantities
pub mod quantity;
/// Purchase-order reconciliation
pub mod reconcile;
