//! PostgreSQL persistence for the land-rights claim system: connection
//! pooling, migrations, repositories over the relational schema, and
//! adapters that implement the domain ports.
//!
//! # Architecture
//!
//! Two layers:
//! - **Repositories** speak SQL and row types only; they know nothing about
//!   domain semantics beyond the schema.
//! - **Adapters** implement the domain port traits on top of repositories,
//!   owning the domain/row conversions and error translation.
//!
//! Claims are stored with optimistic concurrency: every write carries the
//! version the caller loaded, and a mismatch surfaces as a conflict rather
//! than silently overwriting a parallel decision.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, PostgresClaimStore};
//!
//! let pool = create_pool(config).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresClaimStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresClaimStore, PostgresSchemeCatalog, PostgresUserDirectory};
pub use error::DatabaseError;
pub use pool::{
    create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool,
};
