//! Shared test support for the land-claims workspace.
//!
//! Everything here exists so integration and domain tests can set up
//! realistic claims without repeating boilerplate:
//!
//! - `fixtures`: ready-made actors, parcels, and claims
//! - `builders`: fluent construction of claims in any workflow state
//! - `database`: Postgres containers and schema setup for db-backed tests
//! - `assertions`: domain-aware assertion helpers
//! - `generators`: proptest strategies for fuzzing domain types

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
