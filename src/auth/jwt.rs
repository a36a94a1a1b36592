use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Fallback TTL when no explicit lifetime is requested. Production issuance
/// passes `config.access_token_ttl_secs` instead.
pub const DEFAULT_TTL_SECS: i64 = 900;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

pub fn create_access_token(user_id: Uuid, ttl_secs: Option<i64>, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        exp: (now + Duration::seconds(ttl_secs.unwrap_or(DEFAULT_TTL_SECS))).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(config.jwt_algorithm),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create access token: {}", e)))
}

/// Decode and verify a token. The algorithm is pinned to the configured one,
/// so unsigned or alg-swapped tokens are rejected. Every failure mode
/// collapses into the uniform `Unauthorized`.
pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;

    fn test_config(secret: &str, algorithm: Algorithm) -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            db_max_connections: 5,
            db_acquire_timeout_secs: 5,
            host: "127.0.0.1".into(),
            port: 8000,
            frontend_url: "http://localhost:3000".into(),
            jwt_secret: secret.into(),
            jwt_algorithm: algorithm,
            access_token_ttl_secs: 3600,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let config = test_config("test-secret", Algorithm::HS256);
        let user_id = Uuid::new_v4();

        let token = create_access_token(user_id, Some(60), &config).unwrap();
        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user_id);
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config("test-secret", Algorithm::HS256);
        // Past the default 60s validation leeway
        let token = create_access_token(Uuid::new_v4(), Some(-120), &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = test_config("test-secret", Algorithm::HS256);
        let token = create_access_token(Uuid::new_v4(), Some(60), &config).unwrap();

        // Flip one character in the payload segment
        let payload_pos = token.find('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[payload_pos] = if bytes[payload_pos] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(verify_token(&tampered, &config).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = test_config("secret-a", Algorithm::HS256);
        let verifier = test_config("secret-b", Algorithm::HS256);
        let token = create_access_token(Uuid::new_v4(), Some(60), &issuer).unwrap();
        assert!(verify_token(&token, &verifier).is_err());
    }

    #[test]
    fn test_algorithm_is_pinned() {
        let issuer = test_config("test-secret", Algorithm::HS256);
        let verifier = test_config("test-secret", Algorithm::HS384);
        let token = create_access_token(Uuid::new_v4(), Some(60), &issuer).unwrap();
        assert!(verify_token(&token, &verifier).is_err());
    }

    #[test]
    fn test_missing_sub_rejected() {
        let config = test_config("test-secret", Algorithm::HS256);

        #[derive(serde::Serialize)]
        struct NoSub {
            exp: i64,
            iat: i64,
        }
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSub {
                exp: now + 60,
                iat: now,
            },
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let config = test_config("test-secret", Algorithm::HS256);
        assert!(verify_token("not.a.jwt", &config).is_err());
        assert!(verify_token("", &config).is_err());
    }

    #[test]
    fn test_default_ttl_applied() {
        let config = test_config("test-secret", Algorithm::HS256);
        let token = create_access_token(Uuid::new_v4(), None, &config).unwrap();
        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, DEFAULT_TTL_SECS);
    }
}
