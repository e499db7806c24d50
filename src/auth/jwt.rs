// JWT session tokens
// A token carries the actor's id and role; both are fixed for its lifetime

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::domain::user::{Actor, Role};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID (subject)
    pub sub: Uuid,
    /// Role held for the whole session
    pub role: Role,
    /// Expiry timestamp (seconds since epoch)
    pub exp: usize,
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role)
    }
}

/// Creates an HS256 token for `actor` expiring after `ttl_hours`
///
/// # Example
/// ```
/// use teamdesk_api::auth::jwt::{create_token, verify_token};
/// use teamdesk_api::domain::user::{Actor, Role};
/// use uuid::Uuid;
///
/// let actor = Actor::new(Uuid::new_v4(), Role::HrManager);
/// let token = create_token(&actor, "your-secret-key", 8).unwrap();
///
/// let claims = verify_token(&token, "your-secret-key").expect("valid token");
/// assert_eq!(claims.actor(), actor);
/// ```
pub fn create_token(actor: &Actor, secret: &str, ttl_hours: i64) -> Result<String, AuthError> {
    let expiry = Duration::try_hours(ttl_hours)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or(AuthError::Lifetime(ttl_hours))?;
    let claims = Claims {
        sub: actor.id,
        role: actor.role,
        exp: expiry.timestamp().max(0) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

/// Verifies signature and expiry, returning the decoded claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn token_round_trips_actor() {
        let actor = Actor::new(Uuid::new_v4(), Role::TeamManager);
        let token = create_token(&actor, TEST_SECRET, 8).expect("valid token");

        let claims = verify_token(&token, TEST_SECRET).expect("valid verification");
        assert_eq!(claims.sub, actor.id);
        assert_eq!(claims.role, Role::TeamManager);
    }

    #[test]
    fn wrong_secret_fails() {
        let actor = Actor::new(Uuid::new_v4(), Role::Employee);
        let token = create_token(&actor, TEST_SECRET, 8).expect("valid token");

        assert!(verify_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn invalid_token_fails() {
        assert!(verify_token("invalid.token.string", TEST_SECRET).is_err());
    }

    #[test]
    fn expired_token_fails() {
        let actor = Actor::new(Uuid::new_v4(), Role::Admin);
        // Default validation allows 60s of leeway, so go well past it
        let token = create_token(&actor, TEST_SECRET, -2).expect("valid token");

        assert!(verify_token(&token, TEST_SECRET).is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let actor = Actor::new(Uuid::new_v4(), Role::Admin);

        let result = create_token(&actor, TEST_SECRET, i64::MAX);
        assert!(matches!(result, Err(AuthError::Lifetime(i64::MAX))));

        let result = create_token(&actor, TEST_SECRET, 24 * 365 * 500_000);
        assert!(matches!(result, Err(AuthError::Lifetime(_))));
    }

    #[test]
    fn token_expiry_set() {
        let actor = Actor::new(Uuid::new_v4(), Role::Admin);
        let token = create_token(&actor, TEST_SECRET, 8).expect("valid token");

        let claims = verify_token(&token, TEST_SECRET).expect("valid verification");
        let expiry_time = claims.exp as i64;
        let now = Utc::now().timestamp();
        let in_8_hours = (Utc::now() + Duration::hours(8)).timestamp();

        assert!(expiry_time > now);
        assert!(expiry_time <= in_8_hours + 10);
    }
}
