//! Authentication service: accounts, passwords and bearer credentials

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{AuthResponse, Credential, LoginRequest, Principal, RegisterRequest, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new staff account and sign it in
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let request = request.normalized()?;

        if self.repository.users.username_exists(&request.username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request.username, &request.display_name, &hash, Role::Staff)
            .await?;

        tracing::info!("Registered user {} ({})", user.username, user.id);
        self.issue(user)
    }

    /// Authenticate by username and password
    pub async fn authenticate(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        request.validate().map_err(|_| AppError::InvalidCredentials)?;

        let user = match self.repository.users.get_by_username(request.username.trim()).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login attempt for unknown user {}", request.username);
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.verify_password(&user, &request.password)? {
            tracing::warn!("Failed login for user {}", user.username);
            return Err(AppError::InvalidCredentials);
        }

        self.issue(user)
    }

    /// Resolve a bearer credential to a live principal
    pub async fn resolve(&self, credential: Option<&Credential>) -> AppResult<Principal> {
        let credential = credential
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()))?;

        let claims = UserClaims::from_token(credential.as_str(), &self.config.jwt_secret)
            .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {}", e)))?;

        // The account may have been removed after the token was issued
        let user = self
            .repository
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Account no longer exists".to_string()))?;

        Ok(user.into())
    }

    /// Create the configured administrator unless the username is taken.
    /// Returns true when an account was created.
    pub async fn ensure_admin(&self, username: &str, password: &str, display_name: &str) -> AppResult<bool> {
        if self.repository.users.username_exists(username).await? {
            return Ok(false);
        }

        let hash = self.hash_password(password)?;
        let user = self
            .repository
            .users
            .create(username, display_name, &hash, Role::Admin)
            .await?;

        tracing::info!("Created bootstrap administrator {} ({})", user.username, user.id);
        Ok(true)
    }

    fn issue(&self, user: User) -> AppResult<AuthResponse> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(AuthResponse {
            token: Credential(token),
            principal: user.into(),
        })
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
