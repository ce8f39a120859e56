//! API configuration

use serde::Deserialize;

/// API configuration
///
/// Every field can be set through the environment with an `API_` prefix
/// (`API_PORT`, `API_JWT_SECRET`, ...). Unset fields fall back to the
/// defaults below, which are suitable for local development only.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// JWT secret for authentication
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// JWT expiration in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_secs: u64,
    /// Database URL
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Seconds between deadline sweeps; 0 disables the background monitor
    #[serde(default = "default_sla_sweep_interval")]
    pub sla_sweep_interval_secs: u64,
    /// Bounded wall-clock budget for asset analysis and document extraction
    #[serde(default = "default_collaborator_timeout")]
    pub collaborator_timeout_secs: u64,
    /// Remote land-cover analysis service; bundled heuristics when unset
    #[serde(default)]
    pub asset_service_url: Option<String>,
    /// API key for the remote analysis service
    #[serde(default)]
    pub asset_service_api_key: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_jwt_expiration() -> u64 {
    3600
}

fn default_database_url() -> String {
    "postgres://localhost/landrights".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sla_sweep_interval() -> u64 {
    3600
}

fn default_collaborator_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: default_jwt_secret(),
            jwt_expiration_secs: default_jwt_expiration(),
            database_url: default_database_url(),
            log_level: default_log_level(),
            sla_sweep_interval_secs: default_sla_sweep_interval(),
            collaborator_timeout_secs: default_collaborator_timeout(),
            asset_service_url: None,
            asset_service_api_key: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_development() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.database_url, "postgres://localhost/landrights");
        assert!(config.asset_service_url.is_none());
        assert_eq!(config.sla_sweep_interval_secs, 3600);
    }

    #[test]
    fn partial_payload_fills_from_defaults() {
        let config: ApiConfig = serde_json::from_value(serde_json::json!({
            "port": 9000,
            "jwt_secret": "s3cret"
        }))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.collaborator_timeout_secs, 10);
    }
}
