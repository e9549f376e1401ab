//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, LoginRequest, RegisterRequest, SessionTokens, User},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

use crate::identity::{Profile, UserId};

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    pool: Arc<PgPool>,
    pepper: String,
    jwt_secret: String,
    /// Emails granted the admin claim at login, lowercased
    admin_emails: Vec<String>,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `admin_emails` - Emails that receive the admin claim
    ///
    /// # Returns
    ///
    /// * `AuthManager` - New authentication manager instance
    pub fn new(
        pool: Arc<PgPool>,
        pepper: String,
        jwt_secret: String,
        admin_emails: Vec<String>,
    ) -> Self {
        Self {
            pool,
            pepper,
            jwt_secret,
            admin_emails: admin_emails.into_iter().map(|e| e.to_lowercase()).collect(),
            access_token_duration: Duration::minutes(15),  // 15 minutes
            refresh_token_duration: Duration::days(7),     // 7 days
        }
    }

    /// Whether an email is on the admin allowlist
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == &email.to_lowercase())
    }

    /// Register a new account
    ///
    /// Also writes the default free-tier profile row so the identity
    /// resolver never has to race account creation. Both rows land in one
    /// transaction; a failed registration leaves neither behind.
    ///
    /// # Arguments
    ///
    /// * `request` - Registration request with email, password, etc.
    ///
    /// # Returns
    ///
    /// * `AuthResult<User>` - Created user or error
    ///
    /// # Errors
    ///
    /// * `AuthError::EmailTaken` - Email already registered
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::WeakPassword` - Password too weak
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let email = request.email.trim().to_lowercase();

        validate_email(&email)?;
        validate_password(&request.password)?;

        // Hash password with Argon2id + pepper
        let password_hash = self.hash_password(&request.password)?;

        let mut tx = self.pool.begin().await?;

        // Check if email exists
        let existing_user = sqlx::query("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;

        if existing_user.is_some() {
            return Err(AuthError::EmailTaken);
        }

        // Insert user
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, display_name, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, display_name, phone, is_active, created_at, last_login
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(&request.display_name)
        .bind(&request.phone)
        .fetch_one(&mut *tx)
        .await?;

        let user = User {
            id: row.get("id"),
            email: row.get("email"),
            display_name: row.get("display_name"),
            phone: row.get("phone"),
            is_active: row.get("is_active"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            last_login: row
                .get::<Option<chrono::NaiveDateTime>, _>("last_login")
                .map(|dt| dt.and_utc()),
        };

        // Seed the profile for the new account. Dropping the transaction on
        // any error here rolls the user row back too, so an account never
        // exists without its profile.
        let profile = Profile::new_default(user.id, user.display_name.clone(), user.email.clone());
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, name, email, phone, subscription_tier)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.subscription_tier.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Login a user
    ///
    /// # Arguments
    ///
    /// * `request` - Login request with email and password
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, SessionTokens)>` - User and session tokens or error
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No account for this email
    /// * `AuthError::InvalidPassword` - Incorrect password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionTokens)> {
        let email = request.email.trim().to_lowercase();

        // Fetch user with password hash
        let user_row = sqlx::query(
            r#"
            SELECT id, email, password_hash, display_name, phone, is_active, created_at, last_login
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&email)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::UserNotFound)?;

        // Verify password
        let password_hash: String = user_row.get("password_hash");
        self.verify_password(&request.password, &password_hash)?;

        let user = User {
            id: user_row.get("id"),
            email: user_row.get("email"),
            display_name: user_row.get("display_name"),
            phone: user_row.get("phone"),
            is_active: user_row.get("is_active"),
            created_at: user_row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            last_login: user_row
                .get::<Option<chrono::NaiveDateTime>, _>("last_login")
                .map(|dt| dt.and_utc()),
        };

        // Update last login
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(self.pool.as_ref())
            .await?;

        // Generate tokens
        let is_admin = self.is_admin_email(&user.email);
        let tokens = self.create_session(user.id, &user.email, is_admin).await?;

        Ok((user, tokens))
    }

    /// Create a new session with access and refresh tokens
    async fn create_session(
        &self,
        user_id: UserId,
        email: &str,
        is_admin: bool,
    ) -> AuthResult<SessionTokens> {
        // Generate access token (JWT)
        let access_token = self.generate_access_token(user_id, email, is_admin)?;

        // Generate refresh token (UUID)
        let refresh_token = Uuid::new_v4().to_string();

        // Store refresh token in database
        let expires_at = Utc::now() + self.refresh_token_duration;
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&refresh_token)
        .bind(user_id)
        .bind(expires_at.naive_utc())
        .execute(self.pool.as_ref())
        .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Refresh access token using refresh token
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Refresh token
    ///
    /// # Returns
    ///
    /// * `AuthResult<SessionTokens>` - New access and refresh tokens
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidRefreshToken` - Refresh token not found
    /// * `AuthError::SessionExpired` - Refresh token expired
    pub async fn refresh_token(&self, refresh_token: String) -> AuthResult<SessionTokens> {
        // Fetch session
        let session_row = sqlx::query(
            r#"
            SELECT token, user_id, created_at, expires_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(&refresh_token)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::InvalidRefreshToken)?;

        // Check if expired
        let expires_at = session_row.get::<chrono::NaiveDateTime, _>("expires_at").and_utc();
        if expires_at < Utc::now() {
            // Delete expired session
            sqlx::query("DELETE FROM sessions WHERE token = $1")
                .bind(&refresh_token)
                .execute(self.pool.as_ref())
                .await?;
            return Err(AuthError::SessionExpired);
        }

        // Fetch user
        let user_id: i64 = session_row.get("user_id");
        let user_row = sqlx::query("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let email: String = user_row.get("email");
        let is_admin = self.is_admin_email(&email);

        // Delete old refresh token (rotation)
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(&refresh_token)
            .execute(self.pool.as_ref())
            .await?;

        // Create new session with rotated tokens
        let new_tokens = self.create_session(user_id, &email, is_admin).await?;

        Ok(new_tokens)
    }

    /// Logout user by invalidating refresh token
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Refresh token to invalidate
    ///
    /// # Returns
    ///
    /// * `AuthResult<()>` - Success or error
    pub async fn logout(&self, refresh_token: String) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(&refresh_token)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    /// Verify an access token
    ///
    /// # Arguments
    ///
    /// * `token` - JWT access token
    ///
    /// # Returns
    ///
    /// * `AuthResult<AccessTokenClaims>` - Decoded claims or error
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidPassword)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidPassword)
    }

    /// Generate JWT access token
    fn generate_access_token(
        &self,
        user_id: UserId,
        email: &str,
        is_admin: bool,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id,
            email: email.to_string(),
            is_admin,
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }
}

/// Validate email format
fn validate_email(email: &str) -> AuthResult<()> {
    let len = email.len();
    if len < 5 || len > 254 {
        return Err(AuthError::InvalidEmail(
            "Email must be 5-254 characters".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail("Email must contain '@'".to_string()));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(AuthError::InvalidEmail(
            "Email address is malformed".to_string(),
        ));
    }

    Ok(())
}

/// Validate password strength
fn validate_password(password: &str) -> AuthResult<()> {
    if password.len() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Check for at least one number, one uppercase, one lowercase
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());

    if !has_digit || !has_uppercase || !has_lowercase {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one number, one uppercase and one lowercase letter"
                .to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn offline_manager(admin_emails: Vec<String>) -> AuthManager {
        // connect_lazy never touches the network, so the pure methods are
        // testable without a running database.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        AuthManager::new(
            Arc::new(pool),
            "pepper".to_string(),
            "jwt-test-secret".to_string(),
            admin_emails,
        )
    }

    #[tokio::test]
    async fn test_password_hash_round_trip() {
        let manager = offline_manager(vec![]);
        let hash = manager.hash_password("SecurePass123").unwrap();

        assert!(manager.verify_password("SecurePass123", &hash).is_ok());
        assert!(matches!(
            manager.verify_password("WrongPass123", &hash),
            Err(AuthError::InvalidPassword)
        ));
    }

    #[tokio::test]
    async fn test_pepper_is_part_of_the_hash_input() {
        let manager = offline_manager(vec![]);
        let other = {
            let pool = PgPoolOptions::new()
                .connect_lazy("postgres://localhost/unused")
                .unwrap();
            AuthManager::new(
                Arc::new(pool),
                "different-pepper".to_string(),
                "jwt-test-secret".to_string(),
                vec![],
            )
        };

        let hash = manager.hash_password("SecurePass123").unwrap();
        assert!(other.verify_password("SecurePass123", &hash).is_err());
    }

    #[tokio::test]
    async fn test_access_token_round_trip() {
        let manager = offline_manager(vec!["owner@academy.example".to_string()]);
        let token = manager
            .generate_access_token(42, "owner@academy.example", true)
            .unwrap();

        let claims = manager.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "owner@academy.example");
        assert!(claims.is_admin);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_rejected() {
        let manager = offline_manager(vec![]);
        let forged = {
            let pool = PgPoolOptions::new()
                .connect_lazy("postgres://localhost/unused")
                .unwrap();
            let other = AuthManager::new(
                Arc::new(pool),
                "pepper".to_string(),
                "attacker-secret".to_string(),
                vec![],
            );
            other.generate_access_token(1, "a@b.example", false).unwrap()
        };

        assert!(manager.verify_access_token(&forged).is_err());
    }

    #[tokio::test]
    async fn test_admin_allowlist_is_case_insensitive() {
        let manager = offline_manager(vec!["Owner@Academy.example".to_string()]);
        assert!(manager.is_admin_email("owner@academy.example"));
        assert!(manager.is_admin_email("OWNER@ACADEMY.EXAMPLE"));
        assert!(!manager.is_admin_email("student@academy.example"));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("student@example.com").is_ok());
        assert!(validate_email("no-at-sign.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("student@nodot").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(matches!(
            validate_password("short1A"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("alllowercase123").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }
}
