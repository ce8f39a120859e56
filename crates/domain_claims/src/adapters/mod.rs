//! External adapters for the claims domain
//!
//! Collaborator services behind the domain ports. Each adapter translates
//! between a remote API's wire format and the internal models, so the
//! workflow can swap the bundled heuristics for a real service at startup:
//!
//! ```rust,ignore
//! use domain_claims::adapters::{RemoteAssetAdapter, RemoteAssetConfig};
//! use domain_claims::AssetAnalyzer;
//! use std::sync::Arc;
//!
//! let adapter = RemoteAssetAdapter::new(RemoteAssetConfig {
//!     base_url: "https://assets.example.gov.in/api/v1".to_string(),
//!     api_key: std::env::var("ASSET_API_KEY")?,
//!     ..Default::default()
//! });
//! let analyzer: Arc<dyn AssetAnalyzer> = Arc::new(adapter);
//! ```

pub mod asset_service;

pub use asset_service::{RemoteAssetAdapter, RemoteAssetConfig};
