use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{AuthSession, Credentials, Registration, Role, User, UserId};
use super::password::{hash_password, verify_decoy, verify_password, PasswordError};
use super::repository::UserRepository;
use crate::auth::{AuthError, TokenService};
use crate::storage::StoreError;
use crate::validation::ValidationErrors;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Registration, login, and admin bootstrap.
pub struct AccountService<U> {
    users: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> AccountService<U>
where
    U: UserRepository + 'static,
{
    pub fn new(users: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Self-service sign-up. Always creates a `user`; admins come from
    /// [`AccountService::bootstrap_admin`].
    pub async fn register(&self, registration: Registration) -> Result<AuthSession, AccountError> {
        let user = self.create(registration, Role::User).await?;
        info!(user_id = %user.id, "account registered");
        self.session_for(&user)
    }

    pub async fn login(&self, credentials: Credentials) -> Result<AuthSession, AccountError> {
        let mut errors = ValidationErrors::new();
        let email = errors.required("email", credentials.email, "Email is required");
        let password = credentials.password.unwrap_or_default();
        if password.is_empty() {
            errors.push("password", "Password is required");
        }
        errors.finish(())?;

        let email = email.to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            tokio::task::spawn_blocking(move || verify_decoy(&password))
                .await
                .map_err(|err| AccountError::Password(PasswordError::Hash(err.to_string())))?;
            warn!("login attempt for unknown account");
            return Err(AccountError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|err| AccountError::Password(PasswordError::Hash(err.to_string())))??;
        if !matches {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        info!(user_id = %user.id, role = %user.role, "login succeeded");
        self.session_for(&user)
    }

    /// Create an admin account, or report that the email is already taken.
    pub async fn bootstrap_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AccountError> {
        let user = self
            .create(
                Registration {
                    name: Some(name.to_string()),
                    email: Some(email.to_string()),
                    password: Some(password.to_string()),
                },
                Role::Admin,
            )
            .await?;
        info!(user_id = %user.id, "admin account created");
        Ok(user)
    }

    async fn create(&self, registration: Registration, role: Role) -> Result<User, AccountError> {
        let mut errors = ValidationErrors::new();
        let name = errors.required("name", registration.name, "Name is required");
        let email = errors.email("email", registration.email);
        let password = registration.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        errors.finish(())?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|err| AccountError::Password(PasswordError::Hash(err.to_string())))??;

        let user = User {
            id: UserId::generate(),
            name,
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        };
        self.users.insert(user).await.map_err(|err| match err {
            StoreError::Conflict => AccountError::EmailTaken,
            other => AccountError::Store(other),
        })
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, AccountError> {
        let issued = self.tokens.issue(user)?;
        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.public_view(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
