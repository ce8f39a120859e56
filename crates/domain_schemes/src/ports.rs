//! Port for the scheme catalog
//!
//! The catalog is read-mostly: eligibility matching only lists active
//! schemes, and administration happens out of band. The database adapter
//! lives in `infra_db`; an in-memory mock ships behind the `mock` feature
//! for tests.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata, PortError, SchemeId};

use crate::scheme::{Scheme, SchemeStatus};

/// Port for the scheme system of record
#[async_trait]
pub trait SchemeCatalog: DomainPort + HealthCheckable {
    /// Retrieves a scheme by ID
    ///
    /// # Arguments
    ///
    /// * `id` - The scheme identifier
    /// * `metadata` - Optional operation metadata for tracing/auditing
    ///
    /// # Returns
    ///
    /// The scheme if found, or `PortError::NotFound`
    async fn get_scheme(
        &self,
        id: SchemeId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Scheme, PortError>;

    /// Lists schemes, optionally restricted to one status, sorted by name
    async fn list_schemes(
        &self,
        status: Option<SchemeStatus>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Scheme>, PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    //! In-memory catalog for tests

    use std::collections::HashMap;
    use std::sync::Arc;

    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    use super::*;

    /// `SchemeCatalog` backed by a `HashMap`
    #[derive(Debug, Default)]
    pub struct MockSchemeCatalog {
        schemes: Arc<RwLock<HashMap<SchemeId, Scheme>>>,
    }

    impl MockSchemeCatalog {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the catalog for testing
        pub async fn with_schemes(schemes: Vec<Scheme>) -> Self {
            let catalog = Self::new();
            {
                let mut guard = catalog.schemes.write().await;
                for scheme in schemes {
                    guard.insert(scheme.id, scheme);
                }
            }
            catalog
        }

        pub async fn add_scheme(&self, scheme: Scheme) {
            self.schemes.write().await.insert(scheme.id, scheme);
        }
    }

    impl DomainPort for MockSchemeCatalog {}

    #[async_trait]
    impl HealthCheckable for MockSchemeCatalog {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-scheme-catalog".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: chrono::Utc::now(),
            }
        }
    }

    #[async_trait]
    impl SchemeCatalog for MockSchemeCatalog {
        async fn get_scheme(
            &self,
            id: SchemeId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Scheme, PortError> {
            self.schemes
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Scheme", id.to_string()))
        }

        async fn list_schemes(
            &self,
            status: Option<SchemeStatus>,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Scheme>, PortError> {
            let guard = self.schemes.read().await;
            let mut schemes: Vec<Scheme> = guard
                .values()
                .filter(|scheme| status.map(|s| scheme.status == s).unwrap_or(true))
                .cloned()
                .collect();
            schemes.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(schemes)
        }
    }
}
