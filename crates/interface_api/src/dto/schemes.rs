//! Scheme DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_schemes::{EligibilityRule, Scheme, SchemeStatus};

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListSchemesQuery {
    pub status: Option<String>,
}

impl ListSchemesQuery {
    pub fn status(&self) -> Result<Option<SchemeStatus>, ApiError> {
        self.status
            .as_deref()
            .map(|raw| {
                raw.parse::<SchemeStatus>()
                    .map_err(|_| ApiError::Validation(format!("Unknown scheme status: {raw}")))
            })
            .transpose()
    }
}

#[derive(Debug, Serialize)]
pub struct SchemeResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: SchemeStatus,
    pub budget: Option<Decimal>,
    pub department: String,
    pub description: String,
    pub rules: Vec<EligibilityRule>,
    pub benefits: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Scheme> for SchemeResponse {
    fn from(scheme: &Scheme) -> Self {
        Self {
            id: scheme.id.to_string(),
            name: scheme.name.clone(),
            category: scheme.category.clone(),
            status: scheme.status,
            budget: scheme.budget,
            department: scheme.department.clone(),
            description: scheme.description.clone(),
            rules: scheme.rules.clone(),
            benefits: scheme.benefits.clone(),
            created_at: scheme.created_at,
            updated_at: scheme.updated_at,
        }
    }
}

/// Recommendation output for one claim
#[derive(Debug, Serialize)]
pub struct EligibleSchemesResponse {
    pub claim_id: String,
    pub eligible: Vec<SchemeResponse>,
}
