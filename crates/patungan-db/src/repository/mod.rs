//! # Repository Module
//!
//! Repository implementations for database entities.
//!
//! ## Repository Pattern
//! Each repository owns a clone of the connection pool and exposes typed
//! operations for one entity. Handlers never write SQL.

pub mod bill;
pub mod user;

pub use bill::BillRepository;
pub use user::{UserRecord, UserRepository};
