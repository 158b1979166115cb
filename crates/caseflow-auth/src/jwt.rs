//! JWT creation and verification.
//!
//! Tokens are HS256-signed with the secret from [`JwtConfig`].

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use caseflow_config::JwtConfig;
use caseflow_core::AppError;

use crate::claims::Claims;

/// Creates an access token for an authenticated user.
///
/// # Errors
///
/// Returns an internal error if token encoding fails.
pub fn create_access_token(
    user_id: i32,
    username: &str,
    user_type: i32,
    center_id: Option<i32>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        user_type: Some(user_type),
        center_id,
        exp,
        iat: now,
    };

    encode_claims(&claims, jwt_config)
}

/// Signs arbitrary claims. Mostly useful for tests and tooling that need to
/// mint tokens with unusual payloads.
pub fn encode_claims(claims: &Claims, jwt_config: &JwtConfig) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error if the signature is invalid, the token has
/// expired, or it is malformed.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_create_and_verify() {
        let token = create_access_token(42, "nomsa", 3, Some(7), &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "nomsa");
        assert_eq!(claims.user_type, Some(3));
        assert_eq!(claims.center_id, Some(7));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_access_token(1, "root", 1, None, &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            access_token_expiry: 3600,
        };

        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "1".to_string(),
            username: "root".to_string(),
            user_type: Some(1),
            center_id: None,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode_claims(&claims, &config()).unwrap();

        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_token("not.a.jwt", &config()).is_err());
    }
}
