//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::{AuthConfig, BootstrapConfig},
    error::{AppError, AppResult},
    models::user::{CreateUser, NewUser, Role, User, UserClaims},
    repository::Repository,
};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by email and password, returning a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let invalid = || AppError::Authentication("Invalid email or password".to_string());

        let user = self
            .repository
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&user.password, password)? {
            tracing::warn!(user_id = user.id, "Failed login attempt");
            return Err(invalid());
        }

        let token = self.issue_token(user.id, user.role)?;
        tracing::info!(user_id = user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    /// Mint a token for a user id and role
    pub fn issue_token(&self, user_id: i32, role: Role) -> AppResult<String> {
        UserClaims::new(user_id, role, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Decode and verify a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Create a new user
    pub async fn create_user(&self, request: CreateUser) -> AppResult<User> {
        request.validate()?;

        let new_user = NewUser {
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password_hash: hash_password(&request.password)?,
            role: request.role.unwrap_or_default(),
        };

        let user = self.repository.users.create(&new_user).await?;
        tracing::info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Create the configured administrator when no user exists yet
    pub async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<Option<User>> {
        let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password) else {
            return Ok(None);
        };

        if self.repository.users.count().await? > 0 {
            return Ok(None);
        }

        tracing::info!(email = %email, "No users found, creating bootstrap administrator");
        let admin = self
            .create_user(CreateUser {
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
                email: email.clone(),
                password: password.clone(),
                role: Some(Role::Admin),
            })
            .await?;
        Ok(Some(admin))
    }
}
