//! JWT service for token generation and validation
//!
//! Tokens are signed with HS256 using a secret shared by the authentication
//! service (which issues them) and the gallery service (which verifies them).

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret used to sign and verify tokens
    pub secret: String,
    /// Token lifetime in seconds (default: 24 hours)
    pub token_ttl: u64,
}

impl From<&AuthConfig> for JwtConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            token_ttl: config.token_ttl_seconds,
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// User email at issue time
    pub email: String,
    /// Token ID, used for revocation
    pub jti: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Generate a token for a user
    pub fn generate_token(&self, user_id: i64, email: &str) -> Result<(String, Claims)> {
        let now = now_secs()?;
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + self.config.token_ttl,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the token lifetime
    pub fn token_ttl(&self) -> u64 {
        self.config.token_ttl
    }
}

/// Seconds since the Unix epoch
pub fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, ttl: u64) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            token_ttl: ttl,
        })
    }

    #[test]
    fn test_generate_and_validate() {
        let jwt = service("test-secret", 3600);
        let (token, issued) = jwt.generate_token(7, "ada@example.com").unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims, issued);
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let issuer = service("secret-a", 3600);
        let verifier = service("secret-b", 3600);
        let (token, _) = issuer.generate_token(1, "a@b.co").unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let jwt = service("test-secret", 0);
        let claims = Claims {
            sub: 1,
            email: "a@b.co".to_string(),
            jti: Uuid::new_v4(),
            iat: 1_000,
            exp: 1_001,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &jwt.encoding_key).unwrap();
        assert!(jwt.validate_token(&token).is_err());
    }

    #[test]
    fn test_each_token_gets_unique_id() {
        let jwt = service("test-secret", 60);
        let (_, a) = jwt.generate_token(1, "a@b.co").unwrap();
        let (_, b) = jwt.generate_token(1, "a@b.co").unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
