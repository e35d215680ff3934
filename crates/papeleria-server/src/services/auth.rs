//! Authentication service

use crate::storage::Database;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use papeleria_types::{AuthToken, User, UserLogin, UserRegistration, MAX_NAME_LEN};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 6;

/// Longest token lifetime accepted from configuration (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Name is longer than 120 characters")]
    NameTooLong,

    #[error("Password must be at least 6 characters")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("This email is already registered")]
    EmailTaken,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct AuthService {
    db: Arc<Database>,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    /// `token_ttl_hours` is clamped to `1..=MAX_TOKEN_TTL_HOURS`
    pub fn new(db: Arc<Database>, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            db,
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
        }
    }

    /// Create an account; the password is stored as an argon2 hash
    pub async fn register(&self, req: &UserRegistration) -> Result<User, AuthError> {
        let name = req.name.trim();
        let email = req.email.trim();
        if name.is_empty() || email.is_empty() || req.password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AuthError::NameTooLong);
        }
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if req.password != req.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        if self.db.get_user_by_email(email).await?.is_some() {
            info!("Registration rejected, {} already registered", email);
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&req.password)?;
        let id = self.db.create_user(name, email, &password_hash).await?;
        info!("Registered user {} ({})", id, email);

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    pub async fn login(&self, req: &UserLogin) -> Result<(User, AuthToken), AuthError> {
        let email = req.email.trim();

        if let Some((user, password_hash)) = self.db.get_user_by_email(email).await? {
            if verify_password(&req.password, &password_hash)? {
                let token = self.generate_token(user.id)?;
                return Ok((user, token));
            }
        }

        warn!("Login failed for: {}", email);
        Err(AuthError::InvalidCredentials)
    }

    /// Resolve a bearer token to the user id it was issued for
    pub fn validate_token(&self, token: &str) -> Result<i64, AuthError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        token_data
            .claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("malformed subject".to_string()))
    }

    pub async fn current_user(&self, user_id: i64) -> Result<Option<User>, AuthError> {
        Ok(self.db.get_user_by_id(user_id).await?)
    }

    fn generate_token(&self, user_id: i64) -> Result<AuthToken, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))?;

        Ok(AuthToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_ttl.num_seconds(),
        })
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, password_hash: &str) -> anyhow::Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    exp: i64,
    iat: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> AuthService {
        let db = Arc::new(Database::in_memory().await.unwrap());
        AuthService::new(db, "test-secret".to_string(), 24)
    }

    fn registration(email: &str, password: &str, confirm: &str) -> UserRegistration {
        UserRegistration {
            name: "Admin".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secreto123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secreto123", &hash).unwrap());
        assert!(!verify_password("otra-clave", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service().await;
        let user = auth
            .register(&registration("admin@papeleria.ec", "secreto123", "secreto123"))
            .await
            .unwrap();

        let (logged_in, token) = auth
            .login(&UserLogin {
                email: "admin@papeleria.ec".to_string(),
                password: "secreto123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(logged_in.id, user.id);
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 24 * 3600);
        assert_eq!(auth.validate_token(&token.access_token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let auth = service().await;

        assert!(matches!(
            auth.register(&registration("admin@papeleria.ec", "secreto123", "secreto124"))
                .await,
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            auth.register(&registration("sin-arroba", "secreto123", "secreto123"))
                .await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            auth.register(&registration("admin@papeleria.ec", "abc", "abc")).await,
            Err(AuthError::WeakPassword)
        ));
        assert!(matches!(
            auth.register(&registration("", "secreto123", "secreto123")).await,
            Err(AuthError::MissingFields)
        ));

        auth.register(&registration("admin@papeleria.ec", "secreto123", "secreto123"))
            .await
            .unwrap();
        assert!(matches!(
            auth.register(&registration("admin@papeleria.ec", "secreto123", "secreto123"))
                .await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let auth = service().await;
        auth.register(&registration("admin@papeleria.ec", "secreto123", "secreto123"))
            .await
            .unwrap();

        let result = auth
            .login(&UserLogin {
                email: "admin@papeleria.ec".to_string(),
                password: "incorrecta".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let auth = AuthService::new(db, "test-secret".to_string(), i64::MAX);
        let token = auth.generate_token(7).unwrap();

        assert_eq!(token.expires_in, MAX_TOKEN_TTL_HOURS * 3600);
        assert_eq!(auth.validate_token(&token.access_token).unwrap(), 7);
    }

    #[tokio::test]
    async fn test_tampered_token_is_rejected() {
        let auth = service().await;
        let other = AuthService::new(
            Arc::new(Database::in_memory().await.unwrap()),
            "another-secret".to_string(),
            24,
        );
        let token = other.generate_token(1).unwrap();

        assert!(matches!(
            auth.validate_token(&token.access_token),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(auth.validate_token("not-a-jwt").is_err());
    }
}
