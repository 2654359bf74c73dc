use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::errors::{Result, ShortlyError};

/// Tokens are valid for 72 hours from issue.
pub const TOKEN_LIFETIME_HOURS: i64 = 72;

const BEARER_PREFIX: &str = "Bearer ";

/// Token payload. Unknown or missing fields fail decoding.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    pub userid: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Caller identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

/// Issues and verifies HS256 identity tokens. Stateless: nothing is stored
/// and a token cannot be revoked before it expires.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        // Only HS256 is accepted; a header naming any other algorithm is rejected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        if config.jwt_secret.is_empty() {
            warn!(
                "JWT secret not configured, generating a random one; tokens will not survive a restart"
            );
            return Self::new(&crate::utils::generate_random_code(64));
        }
        Self::new(&config.jwt_secret)
    }

    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            userid: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ShortlyError::internal(format!("token signing failed: {}", e)))
    }

    /// Verifies a bare token. Every failure is the same `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Identity> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            ShortlyError::unauthorized("invalid or expired token")
        })?;

        let user_id = Uuid::parse_str(&data.claims.userid).map_err(|e| {
            debug!("Token carries a malformed user id: {}", e);
            ShortlyError::unauthorized("invalid or expired token")
        })?;

        Ok(Identity {
            user_id,
            username: data.claims.username,
        })
    }

    /// Verifies an `Authorization` header value of the form `Bearer <token>`.
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<Identity> {
        let token = header
            .and_then(extract_bearer_token)
            .ok_or_else(|| ShortlyError::unauthorized("missing bearer token"))?;
        self.verify(token)
    }
}

pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_32_bytes_long!!";

    fn create_test_service() -> JwtService {
        JwtService::new(SECRET)
    }

    fn sign_raw(claims: &Claims, alg: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, "jane").unwrap();
        let identity = service.verify(&token).unwrap();

        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.username, "jane");
    }

    #[test]
    fn test_token_expires_after_72_hours() {
        let service = create_test_service();
        let token = service.issue(Uuid::new_v4(), "jane").unwrap();

        let data = decode::<Claims>(&token, &service.decoding_key, &service.validation).unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, 72 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = JwtService::new("secret1_32_bytes_long_enough!!");
        let service2 = JwtService::new("secret2_32_bytes_long_enough!!");

        let token = service1.issue(Uuid::new_v4(), "jane").unwrap();
        assert!(matches!(
            service2.verify(&token),
            Err(ShortlyError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let service = create_test_service();
        let token = service.issue(Uuid::new_v4(), "jane").unwrap();

        let (signed_part, signature) = token.rsplit_once('.').unwrap();
        let first = signature.chars().next().unwrap();
        let flipped = if first == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", signed_part, flipped, &signature[1..]);

        assert!(service.verify(&tampered).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();
        let now = Utc::now();
        let claims = Claims {
            userid: Uuid::new_v4().to_string(),
            username: "jane".to_string(),
            iat: (now - Duration::hours(73)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = sign_raw(&claims, Algorithm::HS256, SECRET);

        assert!(matches!(
            service.verify(&token),
            Err(ShortlyError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let service = create_test_service();
        let now = Utc::now();
        let claims = Claims {
            userid: Uuid::new_v4().to_string(),
            username: "jane".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = sign_raw(&claims, Algorithm::HS512, SECRET);

        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_alg_none_rejected() {
        let service = create_test_service();
        let token = service.issue(Uuid::new_v4(), "jane").unwrap();
        let payload = token.split('.').nth(1).unwrap();

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);
        assert!(service.verify(&unsigned).is_err());
    }

    #[test]
    fn test_extra_claim_rejected() {
        #[derive(Serialize)]
        struct WithRole {
            userid: String,
            username: String,
            iat: i64,
            exp: i64,
            role: String,
        }

        let service = create_test_service();
        let now = Utc::now();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &WithRole {
                userid: Uuid::new_v4().to_string(),
                username: "jane".to_string(),
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
                role: "admin".to_string(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_verify_bearer_header_shapes() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();
        let token = service.issue(user_id, "jane").unwrap();

        let header = format!("Bearer {}", token);
        assert_eq!(
            service.verify_bearer(Some(&header)).unwrap().user_id,
            user_id
        );

        assert!(service.verify_bearer(None).is_err());
        assert!(service.verify_bearer(Some(&token)).is_err());
        assert!(service.verify_bearer(Some("Bearer ")).is_err());
        assert!(service.verify_bearer(Some("Basic dXNlcjpwYXNz")).is_err());
        assert!(service.verify_bearer(Some("Bearer not.a.jwt")).is_err());
    }

    #[test]
    fn test_from_config_without_secret_still_works() {
        let service = JwtService::from_config(&AuthConfig::default());
        let token = service.issue(Uuid::new_v4(), "jane").unwrap();
        assert!(service.verify(&token).is_ok());
    }
}
