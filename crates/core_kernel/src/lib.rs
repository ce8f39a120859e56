//! Core kernel for the land-rights claims system
//!
//! This crate provides the foundational types used across all domain modules:
//!
//! - **Identifiers**: Type-safe UUID-backed identifiers for all entities
//! - **Geometry**: GeoJSON-compatible parcel geometry with planar overlap math
//! - **Actor**: Authenticated principals and their workflow roles
//! - **Ports**: Hexagonal architecture port traits and adapter infrastructure
//! - **Error**: Core error types shared by every domain
//!
//! Domain crates depend only on this kernel, never on each other.

pub mod actor;
pub mod error;
pub mod geometry;
pub mod identifiers;
pub mod ports;

pub use actor::{Actor, Role};
pub use error::CoreError;
pub use geometry::{BoundingBox, GeoPoint, Geometry, GeometryError};
pub use identifiers::{ClaimId, DocumentId, SchemeId, UserId};
pub use ports::{
    AdapterHealth, CircuitBreakerConfig, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError,
};
