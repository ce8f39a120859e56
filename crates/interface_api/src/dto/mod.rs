//! Request/Response data transfer objects
//!
//! Identifiers cross the wire in their prefixed display form ("CLM-...",
//! "USR-..."); parsers accept the bare UUID as well. Statuses and kinds use
//! the domain wire names directly.

use core_kernel::{ClaimId, SchemeId, UserId};

use crate::error::ApiError;

pub mod claims;
pub mod schemes;

pub(crate) fn parse_claim_id(raw: &str) -> Result<ClaimId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid claim id: {raw}")))
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid user id: {raw}")))
}

pub(crate) fn parse_scheme_id(raw: &str) -> Result<SchemeId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid scheme id: {raw}")))
}
