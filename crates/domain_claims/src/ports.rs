//! Claims Domain Ports
//!
//! This module defines the port interfaces the claims domain needs from the
//! outside world, enabling swappable implementations (internal database,
//! external collaborators, mock, etc.).
//!
//! # Architecture
//!
//! - [`ClaimStore`]: the system of record for claims
//! - [`UserDirectory`]: read-only lookup of actors for routing and alerts
//! - [`Notifier`]: claimant and officer messaging
//! - [`AssetAnalyzer`]: parcel land-cover estimation
//! - [`DocumentExtractor`]: field extraction from uploaded evidence
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_claims::ports::ClaimStore;
//! use std::sync::Arc;
//!
//! pub struct ClaimsService {
//!     store: Arc<dyn ClaimStore>,
//! }
//!
//! impl ClaimsService {
//!     pub async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
//!         self.store.get_claim(id, None).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{
    ClaimId, DomainPort, Geometry, HealthCheckResult, HealthCheckable, OperationMetadata,
    PortError, Role, UserId,
};

use crate::assets::AssetSummary;
use crate::claim::{Claim, ClaimStatus};
use crate::document::ExtractionResult;

/// Query parameters for finding claims
#[derive(Debug, Clone)]
pub struct ClaimQuery {
    /// Filter by state
    pub state: Option<String>,
    /// Filter by district
    pub district: Option<String>,
    /// Filter by village
    pub village: Option<String>,
    /// Filter by workflow status
    pub status: Option<ClaimStatus>,
    /// Filter by owning citizen account
    pub claimant: Option<UserId>,
    /// Case-insensitive match on claimant name, village, or survey number
    pub search: Option<String>,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
}

impl Default for ClaimQuery {
    fn default() -> Self {
        Self {
            state: None,
            district: None,
            village: None,
            status: None,
            claimant: None,
            search: None,
            page: 1,
            limit: 20,
        }
    }
}

impl ClaimQuery {
    /// Creates a query scoped to one district
    pub fn by_district(district: impl Into<String>) -> Self {
        Self {
            district: Some(district.into()),
            ..Default::default()
        }
    }

    /// Creates a query scoped to one status
    pub fn by_status(status: ClaimStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Creates a query scoped to one claimant's own claims
    pub fn by_claimant(claimant: UserId) -> Self {
        Self {
            claimant: Some(claimant),
            ..Default::default()
        }
    }

    /// Sets page and page size
    pub fn paginate(mut self, page: u32, limit: u32) -> Self {
        self.page = page.max(1);
        self.limit = limit.clamp(1, 100);
        self
    }

    /// Row offset implied by page and limit
    pub fn offset(&self) -> u32 {
        (self.page.max(1) - 1) * self.limit
    }

    /// Whether a claim matches every set filter; used by in-memory
    /// implementations, mirrored in SQL by the database adapter
    pub fn matches(&self, claim: &Claim) -> bool {
        if let Some(ref state) = self.state {
            if !claim.state.eq_ignore_ascii_case(state) {
                return false;
            }
        }
        if let Some(ref district) = self.district {
            if !claim.district.eq_ignore_ascii_case(district) {
                return false;
            }
        }
        if let Some(ref village) = self.village {
            if !claim.village.eq_ignore_ascii_case(village) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if claim.status != status {
                return false;
            }
        }
        if let Some(claimant) = self.claimant {
            if claim.claimant_id != Some(claimant) {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            let hit = claim.claimant_name.to_lowercase().contains(&needle)
                || claim.village.to_lowercase().contains(&needle)
                || claim
                    .survey_number
                    .as_deref()
                    .map(|s| s.to_lowercase().contains(&needle))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        true
    }
}

/// A user as seen by the claims domain: enough to route work and alerts
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub roles: Vec<Role>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub active: bool,
}

/// Port for the claim system of record
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    // ========================================================================
    // Read Operations
    // ========================================================================

    /// Retrieves a claim by ID
    ///
    /// # Arguments
    ///
    /// * `id` - The claim identifier
    /// * `metadata` - Optional operation metadata for tracing/auditing
    ///
    /// # Returns
    ///
    /// The claim if found, or `PortError::NotFound`
    async fn get_claim(
        &self,
        id: ClaimId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError>;

    /// Finds claims matching the query, paginated
    async fn find_claims(
        &self,
        query: ClaimQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError>;

    /// Counts claims matching the query, ignoring pagination
    async fn count_claims(
        &self,
        query: ClaimQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<u64, PortError>;

    /// All claims currently in any of the given statuses
    ///
    /// Used by the deadline sweep; implementations should not paginate.
    async fn find_by_statuses(
        &self,
        statuses: &[ClaimStatus],
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError>;

    /// Claims whose `updated_at` is at or after the given instant
    ///
    /// Used by the anomaly scan to bound its working set.
    async fn find_updated_since(
        &self,
        since: DateTime<Utc>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError>;

    /// Workflow-active claims with geometry in a district, for overlap
    /// screening
    ///
    /// # Arguments
    ///
    /// * `district` - District to screen within
    /// * `exclude` - A claim to leave out (the one being resubmitted)
    /// * `limit` - Upper bound on returned claims
    async fn active_for_screening(
        &self,
        district: &str,
        exclude: Option<ClaimId>,
        limit: u32,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError>;

    // ========================================================================
    // Write Operations
    // ========================================================================

    /// Persists a brand-new claim
    ///
    /// Fails with `PortError::Conflict` if the ID already exists.
    async fn insert_claim(
        &self,
        claim: &Claim,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Persists an updated claim, guarded by optimistic concurrency
    ///
    /// The write only succeeds when the stored row still carries
    /// `expected_version`; the claim is saved with its own (already bumped)
    /// version. A lost race fails with `PortError::Conflict` and changes
    /// nothing.
    ///
    /// # Arguments
    ///
    /// * `claim` - The claim to save, `version` already incremented
    /// * `expected_version` - The version the caller loaded
    async fn save_claim(
        &self,
        claim: &Claim,
        expected_version: i64,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Extension trait for ClaimStore with convenience methods
#[async_trait]
pub trait ClaimStoreExt: ClaimStore {
    /// Fetches one page of claims together with the unpaginated total
    async fn page(
        &self,
        query: ClaimQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<(Vec<Claim>, u64), PortError> {
        let total = self.count_claims(query.clone(), metadata.clone()).await?;
        let claims = self.find_claims(query, metadata).await?;
        Ok((claims, total))
    }

    /// All of one claimant's claims, newest first by creation
    async fn for_claimant(
        &self,
        claimant: UserId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError> {
        self.find_claims(ClaimQuery::by_claimant(claimant), metadata)
            .await
    }
}

// Blanket implementation for all ClaimStore implementors
impl<T: ClaimStore + ?Sized> ClaimStoreExt for T {}

/// Port for actor lookup
///
/// The claims domain never manages users; it only needs to resolve them for
/// ownership checks, work routing, and alert fan-out.
#[async_trait]
pub trait UserDirectory: DomainPort + HealthCheckable {
    /// Retrieves a user by ID
    async fn get_user(
        &self,
        id: UserId,
        metadata: Option<OperationMetadata>,
    ) -> Result<UserRecord, PortError>;

    /// Active officers holding `role`, optionally narrowed to a district
    async fn find_officers(
        &self,
        role: Role,
        district: Option<String>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<UserRecord>, PortError>;

    /// All active Super Admins
    async fn super_admins(
        &self,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<UserRecord>, PortError>;
}

/// Port for outbound claimant and officer messaging
///
/// Implementations must be safe to call from spawned tasks; the workflow
/// never waits on delivery.
#[async_trait]
pub trait Notifier: DomainPort {
    /// Tells a recipient about the claim's current status
    async fn status_update(&self, recipient: &UserRecord, claim: &Claim) -> Result<(), PortError>;

    /// Warns or escalates a stage deadline
    async fn sla_alert(
        &self,
        recipient: &UserRecord,
        claim: &Claim,
        days_in_status: i64,
        breached: bool,
    ) -> Result<(), PortError>;
}

/// Port for parcel land-cover estimation
#[async_trait]
pub trait AssetAnalyzer: DomainPort + HealthCheckable {
    /// Estimates land cover inside the parcel
    async fn analyze(&self, geometry: &Geometry) -> Result<AssetSummary, PortError>;
}

/// Port for pulling structured fields out of uploaded documents
#[async_trait]
pub trait DocumentExtractor: DomainPort {
    /// Extracts fields from the named document
    ///
    /// `excerpt` carries whatever text accompanied the upload; `None` for
    /// image-only uploads.
    async fn extract(
        &self,
        document_name: &str,
        excerpt: Option<&str>,
    ) -> Result<ExtractionResult, PortError>;
}

/// Mock implementations for testing
///
/// These adapters keep everything in memory and are useful for unit testing
/// without database or external collaborator dependencies.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of ClaimStore
    ///
    /// `save_claim` enforces the same optimistic concurrency contract as the
    /// database adapter, so race handling is testable without Postgres.
    #[derive(Debug, Default)]
    pub struct MockClaimStore {
        claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
    }

    impl MockClaimStore {
        /// Creates a new empty mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with claims for testing
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let store = Self::new();
            for claim in claims {
                store.claims.write().await.insert(claim.id, claim);
            }
            store
        }

        /// Snapshot of one stored claim, bypassing the port
        pub async fn stored(&self, id: ClaimId) -> Option<Claim> {
            self.claims.read().await.get(&id).cloned()
        }
    }

    impl DomainPort for MockClaimStore {}

    #[async_trait]
    impl HealthCheckable for MockClaimStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-claim-store".to_string(),
                status: core_kernel::AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ClaimStore for MockClaimStore {
        async fn get_claim(
            &self,
            id: ClaimId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn find_claims(
            &self,
            query: ClaimQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Claim>, PortError> {
            let claims = self.claims.read().await;
            let mut results: Vec<_> = claims
                .values()
                .filter(|c| query.matches(c))
                .cloned()
                .collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            Ok(results
                .into_iter()
                .skip(query.offset() as usize)
                .take(query.limit as usize)
                .collect())
        }

        async fn count_claims(
            &self,
            query: ClaimQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<u64, PortError> {
            let claims = self.claims.read().await;
            Ok(claims.values().filter(|c| query.matches(c)).count() as u64)
        }

        async fn find_by_statuses(
            &self,
            statuses: &[ClaimStatus],
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Claim>, PortError> {
            let claims = self.claims.read().await;
            Ok(claims
                .values()
                .filter(|c| statuses.contains(&c.status))
                .cloned()
                .collect())
        }

        async fn find_updated_since(
            &self,
            since: DateTime<Utc>,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Claim>, PortError> {
            let claims = self.claims.read().await;
            Ok(claims
                .values()
                .filter(|c| c.updated_at >= since)
                .cloned()
                .collect())
        }

        async fn active_for_screening(
            &self,
            district: &str,
            exclude: Option<ClaimId>,
            limit: u32,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Claim>, PortError> {
            let claims = self.claims.read().await;
            Ok(claims
                .values()
                .filter(|c| Some(c.id) != exclude)
                .filter(|c| c.status.is_screening_active())
                .filter(|c| c.geometry.is_some())
                .filter(|c| c.district.eq_ignore_ascii_case(district))
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn insert_claim(
            &self,
            claim: &Claim,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            if claims.contains_key(&claim.id) {
                return Err(PortError::conflict(format!(
                    "Claim {} already exists",
                    claim.id
                )));
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn save_claim(
            &self,
            claim: &Claim,
            expected_version: i64,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            let stored = claims
                .get(&claim.id)
                .ok_or_else(|| PortError::not_found("Claim", claim.id))?;
            if stored.version != expected_version {
                return Err(PortError::conflict(format!(
                    "Claim {} version mismatch: stored {}, expected {}",
                    claim.id, stored.version, expected_version
                )));
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }
    }

    /// In-memory mock implementation of UserDirectory
    #[derive(Debug, Default)]
    pub struct MockUserDirectory {
        users: Arc<RwLock<HashMap<UserId, UserRecord>>>,
    }

    impl MockUserDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with users for testing
        pub async fn with_users(users: Vec<UserRecord>) -> Self {
            let directory = Self::new();
            for user in users {
                directory.users.write().await.insert(user.id, user);
            }
            directory
        }

        pub async fn add_user(&self, user: UserRecord) {
            self.users.write().await.insert(user.id, user);
        }
    }

    impl DomainPort for MockUserDirectory {}

    #[async_trait]
    impl HealthCheckable for MockUserDirectory {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-user-directory".to_string(),
                status: core_kernel::AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl UserDirectory for MockUserDirectory {
        async fn get_user(
            &self,
            id: UserId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<UserRecord, PortError> {
            self.users
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn find_officers(
            &self,
            role: Role,
            district: Option<String>,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<UserRecord>, PortError> {
            let users = self.users.read().await;
            Ok(users
                .values()
                .filter(|u| u.active)
                .filter(|u| u.roles.contains(&role))
                .filter(|u| match (&district, &u.district) {
                    (Some(wanted), Some(has)) => wanted.eq_ignore_ascii_case(has),
                    (Some(_), None) => false,
                    (None, _) => true,
                })
                .cloned()
                .collect())
        }

        async fn super_admins(
            &self,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<UserRecord>, PortError> {
            let users = self.users.read().await;
            Ok(users
                .values()
                .filter(|u| u.active && u.roles.contains(&Role::SuperAdmin))
                .cloned()
                .collect())
        }
    }

    /// Notifier that records every delivery for assertions
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub status_updates: Arc<RwLock<Vec<(UserId, ClaimId, ClaimStatus)>>>,
        pub sla_alerts: Arc<RwLock<Vec<(UserId, ClaimId, bool)>>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn status_update_count(&self) -> usize {
            self.status_updates.read().await.len()
        }

        pub async fn sla_alert_count(&self) -> usize {
            self.sla_alerts.read().await.len()
        }
    }

    impl DomainPort for RecordingNotifier {}

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn status_update(
            &self,
            recipient: &UserRecord,
            claim: &Claim,
        ) -> Result<(), PortError> {
            self.status_updates
                .write()
                .await
                .push((recipient.id, claim.id, claim.status));
            Ok(())
        }

        async fn sla_alert(
            &self,
            recipient: &UserRecord,
            claim: &Claim,
            _days_in_status: i64,
            breached: bool,
        ) -> Result<(), PortError> {
            self.sla_alerts
                .write()
                .await
                .push((recipient.id, claim.id, breached));
            Ok(())
        }
    }
}
