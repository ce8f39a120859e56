//! Bearer-token handling.
//!
//! The API only authenticates: it validates the bearer token and hands the
//! resulting [`Actor`] to the domain layer, which owns every role check.
//! Tokens carry the role wire names as issued by the user directory;
//! unknown names are dropped with a warning so a token minted by a newer
//! deployment still authenticates here.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use core_kernel::{Actor, Role, UserId};

/// Payload carried inside an issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID, prefixed or bare UUID)
    pub sub: String,
    /// Display name
    pub name: String,
    /// User's role wire names
    pub roles: Vec<String>,
    /// District scope for officers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// State scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Issue time, seconds since epoch
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),
}

impl Claims {
    /// Converts validated claims into the domain actor.
    ///
    /// Unknown role names are skipped with a warning; a malformed subject
    /// fails outright since nothing downstream can act without an identity.
    pub fn to_actor(&self) -> Result<Actor, AuthError> {
        let id: UserId = self
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidSubject(self.sub.clone()))?;

        let mut roles = Vec::with_capacity(self.roles.len());
        for raw in &self.roles {
            match raw.parse::<Role>() {
                Ok(role) => roles.push(role),
                Err(_) => warn!(subject = %self.sub, role = %raw, "Skipping unknown role in token"),
            }
        }

        let mut actor = Actor::new(id, self.name.clone(), roles);
        actor.district = self.district.clone();
        actor.state = self.state.clone();
        Ok(actor)
    }
}

/// Issues a signed token for `user_id`, embedding the display name,
/// role wire names, and district scope the API needs to rebuild the
/// actor on later requests.
pub fn create_token(
    user_id: &str,
    name: &str,
    roles: Vec<String>,
    district: Option<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        roles,
        district,
        state: None,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Checks signature and expiry, returning the embedded [`Claims`].
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if matches!(
            e.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ) {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip_preserves_identity() {
        let id = UserId::new();
        let token = create_token(
            &id.to_string(),
            "Asha Patel",
            vec!["Verification Officer".to_string()],
            Some("Mandla".to_string()),
            SECRET,
            60,
        )
        .unwrap();

        let claims = validate_token(&token, SECRET).unwrap();
        let actor = claims.to_actor().unwrap();
        assert_eq!(actor.id, id);
        assert_eq!(actor.roles, vec![Role::VerificationOfficer]);
        assert_eq!(actor.district.as_deref(), Some("Mandla"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(
            &UserId::new().to_string(),
            "x",
            vec![],
            None,
            SECRET,
            60,
        )
        .unwrap();
        assert!(matches!(
            validate_token(&token, "other-secret"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn unknown_roles_are_dropped() {
        let claims = Claims {
            sub: UserId::new().to_string(),
            name: "x".to_string(),
            roles: vec!["Citizen".to_string(), "Galactic Overlord".to_string()],
            district: None,
            state: None,
            exp: 0,
            iat: 0,
        };
        let actor = claims.to_actor().unwrap();
        assert_eq!(actor.roles, vec![Role::Citizen]);
    }

    #[test]
    fn malformed_subject_fails() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            name: "x".to_string(),
            roles: vec![],
            district: None,
            state: None,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(
            claims.to_actor(),
            Err(AuthError::InvalidSubject(_))
        ));
    }
}
