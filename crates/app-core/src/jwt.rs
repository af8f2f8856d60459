//! Validation of the session tokens issued by the authentication service.
//!
//! Tokens follow the shape used by hosted auth providers: the subject is
//! the user's UUID and the signup metadata rides along in
//! `user_metadata` / `app_metadata`.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token format or signature")]
    InvalidToken,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default)]
    pub app_metadata: AppMetadata,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenManager: Send + Sync {
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
}

pub struct JwtConfig {
    pub access_secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Verifies HS512 tokens against the secret shared with the auth service.
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

impl TokenManager for JwtService {
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<Claims>(token, &DecodingKey::from_secret(self.config.access_secret.as_ref()), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    const SECRET: &str = "test_access_secret_key_12345";

    fn create_test_config() -> JwtConfig {
        JwtConfig {
            access_secret: SECRET.to_string(),
            issuer: "test_issuer".to_string(),
            audience: "test_audience".to_string(),
        }
    }

    fn claims(user_id: Uuid, lifetime_secs: i64) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user_id,
            email: Some("rani@example.com".to_string()),
            user_metadata: UserMetadata { full_name: Some("Rani".to_string()), avatar_url: None },
            app_metadata: AppMetadata { provider: Some("google".to_string()) },
            jti: Uuid::new_v4().to_string(),
            iss: "test_issuer".to_string(),
            aud: "test_audience".to_string(),
            exp: (now + Duration::seconds(lifetime_secs)).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    /// Signs claims the way the auth service does.
    fn sign(claims: &Claims, secret: &str) -> String {
        encode(&Header::new(Algorithm::HS512), claims, &EncodingKey::from_secret(secret.as_ref())).unwrap()
    }

    #[test]
    fn test_validate_token() {
        let service = JwtService::new(create_test_config());
        let user_id = Uuid::new_v4();
        let issued = claims(user_id, 3600);

        let validated = service.validate_access_token(&sign(&issued, SECRET)).unwrap();

        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.email.as_deref(), Some("rani@example.com"));
        assert_eq!(validated.user_metadata.full_name.as_deref(), Some("Rani"));
        assert_eq!(validated.app_metadata.provider.as_deref(), Some("google"));
        assert_eq!(validated.jti, issued.jti);
        assert_eq!(validated.exp, issued.iat + 3600);
    }

    #[test]
    fn test_validate_token_with_wrong_secret() {
        let service = JwtService::new(create_test_config());
        let token = sign(&claims(Uuid::new_v4(), 3600), "another_secret");

        assert!(matches!(service.validate_access_token(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_validate_token_with_wrong_audience() {
        let service = JwtService::new(create_test_config());
        let mut foreign = claims(Uuid::new_v4(), 3600);
        foreign.aud = "somebody_else".to_string();

        assert!(matches!(service.validate_access_token(&sign(&foreign, SECRET)), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_validate_token_with_wrong_issuer() {
        let service = JwtService::new(create_test_config());
        let mut foreign = claims(Uuid::new_v4(), 3600);
        foreign.iss = "other_issuer".to_string();

        assert!(matches!(service.validate_access_token(&sign(&foreign, SECRET)), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_validate_token_rejects_other_algorithm() {
        let service = JwtService::new(create_test_config());
        let token =
            encode(&Header::new(Algorithm::HS256), &claims(Uuid::new_v4(), 3600), &EncodingKey::from_secret(SECRET.as_ref()))
                .unwrap();

        assert!(matches!(service.validate_access_token(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_validate_malformed_token() {
        let service = JwtService::new(create_test_config());

        assert!(matches!(service.validate_access_token("not_a_valid_jwt_at_all"), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_token_expiration() {
        let service = JwtService::new(create_test_config());
        let token = sign(&claims(Uuid::new_v4(), -1_000_000), SECRET);

        assert!(matches!(service.validate_access_token(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_claims_without_metadata_deserialize() {
        let raw = serde_json::json!({
            "sub": "3f8a1c52-9d1e-4b6a-8f0e-2b7c4d5e6f70",
            "jti": "abc",
            "iss": "i",
            "aud": "a",
            "exp": 1,
            "iat": 0
        });

        let claims: Claims = serde_json::from_value(raw).unwrap();
        assert!(claims.email.is_none());
        assert_eq!(claims.user_metadata, UserMetadata::default());
        assert_eq!(claims.app_metadata, AppMetadata::default());
    }
}
