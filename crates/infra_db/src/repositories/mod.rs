//! SQL access, one repository per aggregate.
//!
//! Repositories speak SQL and row types only; the adapter layer above
//! maps rows to and from domain types. Conventions shared by all three:
//!
//! - Runtime-checked SQLx queries with `FromRow` row structs
//! - JSONB columns for nested records, TEXT columns for status enums
//! - Transaction support for multi-table writes
//! - Optimistic concurrency control on the claim aggregate

pub mod claims;
pub mod schemes;
pub mod users;

pub use claims::ClaimRepository;
pub use schemes::SchemeRepository;
pub use users::UserRepository;
