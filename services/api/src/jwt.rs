//! JWT service for token generation and validation
//!
//! Access tokens are signed with HS256 using a shared secret and carry the
//! user's id and roles.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::user::User;

/// Shortest secret accepted for signing
const MIN_SECRET_LEN: usize = 32;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret used to sign and verify tokens
    pub secret: String,
    /// Token expiration time in seconds (default: 1 day)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Signing secret, at least 32 bytes
    /// - `JWT_EXPIRY`: Token expiry in seconds (default: 86400)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let token_expiry = std::env::var("JWT_EXPIRY")
            .unwrap_or_else(|_| "86400".to_string()) // 1 day
            .parse()
            .unwrap_or(86400);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User roles
    pub roles: Vec<String>,
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
    pub fn new(config: JwtConfig) -> Result<Self> {
        if config.secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT secret must be at least {} bytes", MIN_SECRET_LEN);
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Generate an access token for a user
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: user.id,
            roles: vec![user.role.clone()],
            iat: now,
            exp: now + self.config.token_expiry,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the token expiry time
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Profile, ROLE_ADMIN};
    use chrono::Utc;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            token_expiry: 60,
        })
        .unwrap()
    }

    fn admin() -> User {
        User {
            id: Uuid::new_v4(),
            email: "root@example.com".to_string(),
            password_hash: String::new(),
            password_reset_token: None,
            password_reset_expires: None,
            role: ROLE_ADMIN.to_string(),
            profile: Profile::default(),
            followers: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip_carries_roles() {
        let service = service();
        let user = admin();

        let token = service.generate_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.roles, vec![ROLE_ADMIN.to_string()]);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_rejects_foreign_tokens() {
        let token = service().generate_token(&admin()).unwrap();
        let other = JwtService::new(JwtConfig {
            secret: "another-secret-that-is-also-long-enough".to_string(),
            token_expiry: 60,
        })
        .unwrap();

        assert!(other.validate_token(&token).is_err());
        assert!(service().validate_token("garbage").is_err());
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = JwtService::new(JwtConfig {
            secret: "short".to_string(),
            token_expiry: 60,
        });
        assert!(result.is_err());
    }
}
