//! Benefit scheme catalog entries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::SchemeId;

use crate::error::SchemeError;
use crate::rules::EligibilityRule;

/// Publication state of a scheme
///
/// Only `Active` schemes take part in eligibility matching; `Draft` entries
/// are being authored and `Archived` ones are kept for record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemeStatus {
    Active,
    Draft,
    Archived,
}

impl SchemeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeStatus::Active => "Active",
            SchemeStatus::Draft => "Draft",
            SchemeStatus::Archived => "Archived",
        }
    }
}

impl fmt::Display for SchemeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeStatus {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(SchemeStatus::Active),
            "Draft" => Ok(SchemeStatus::Draft),
            "Archived" => Ok(SchemeStatus::Archived),
            other => Err(SchemeError::Validation(format!(
                "Unknown scheme status: {other}"
            ))),
        }
    }
}

/// A government benefit scheme
///
/// Read-mostly catalog data: the workflow never mutates schemes, it only
/// matches claims against their eligibility rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: SchemeId,
    pub name: String,
    /// Grouping such as "Housing", "Agriculture", "Livelihood"
    pub category: String,
    pub status: SchemeStatus,
    /// Allocated budget in rupees, when published
    pub budget: Option<Decimal>,
    /// Administering department
    pub department: String,
    pub description: String,
    /// Ordered predicate list; see [`crate::rules`]
    pub rules: Vec<EligibilityRule>,
    /// Human-readable benefit lines shown to claimants
    pub benefits: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scheme {
    /// Creates a draft scheme with no rules or benefits yet
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        department: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, SchemeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemeError::validation("Scheme name is required"));
        }
        let now = Utc::now();
        Ok(Self {
            id: SchemeId::new_v7(),
            name,
            category: category.into(),
            status: SchemeStatus::Draft,
            budget: None,
            department: department.into(),
            description: description.into(),
            rules: Vec::new(),
            benefits: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_status(mut self, status: SchemeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_budget(mut self, budget: Decimal) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_rules(mut self, rules: Vec<EligibilityRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_benefits(mut self, benefits: Vec<impl Into<String>>) -> Self {
        self.benefits = benefits.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == SchemeStatus::Active
    }
}
