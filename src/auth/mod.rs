//! Authentication and authorization.
//!
//! Tokens are double-checked: a JWT signature proves the token was issued
//! here, and a session ledger row proves it has not been revoked since.
//! Logout deletes the row, so a structurally valid token can still be
//! rejected.

use crate::config::Config;
use crate::error::{CivicError, Result};
use crate::model::{Role, User};
use crate::storage::SqliteStorage;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use password_hash::rand_core::{OsRng, RngCore};
use password_hash::SaltString;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Fresh random session id, so two logins in the same second still
    /// produce distinct tokens.
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
}

/// Random 128-bit session id, hex encoded.
fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The authenticated caller attached to a protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Hash a password with argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| CivicError::Other(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
///
/// # Errors
///
/// Returns an error if the stored hash is malformed.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| CivicError::Other(anyhow::anyhow!("stored password hash invalid: {e}")))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CivicError::Other(anyhow::anyhow!(
            "password verification failed: {e}"
        ))),
    }
}

/// Signs and verifies access tokens.
struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // Expiry is exact; the session ledger is the authority anyway
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| CivicError::Other(anyhow::anyhow!("token signing failed: {e}")))
    }

    fn decode(&self, token: &str) -> Result<Claims> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
                Err(CivicError::SessionExpired)
            }
            Err(e) => {
                debug!(error = %e, "token rejected");
                Err(CivicError::InvalidToken)
            }
        }
    }
}

/// The authentication gate protecting administrative operations.
pub struct AuthGate {
    codec: TokenCodec,
    session_ttl: chrono::Duration,
}

impl AuthGate {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            codec: TokenCodec::new(&config.token_secret),
            session_ttl: config.session_ttl(),
        }
    }

    /// Verify credentials, issue a token and record it in the ledger.
    ///
    /// When `role` is given the account must hold exactly that role. The
    /// same error is returned whether the username is unknown, the password
    /// wrong, or the role mismatched.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::InvalidCredentials`] on a failed match, or an
    /// error on storage failure.
    pub fn login(
        &self,
        storage: &mut SqliteStorage,
        username: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<LoginOutcome> {
        let Some(user) = storage.find_user_by_username(username)? else {
            warn!(username, "login attempt for unknown user");
            return Err(CivicError::InvalidCredentials);
        };
        if let Some(required) = role {
            if user.role != required {
                warn!(username, %required, "login attempt against a different role");
                return Err(CivicError::InvalidCredentials);
            }
        }
        if !verify_password(password, &user.password_hash)? {
            warn!(username, "login attempt with wrong password");
            return Err(CivicError::InvalidCredentials);
        }

        let now = Utc::now();
        let expires_at = now + self.session_ttl;
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            sid: new_session_id(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = self.codec.encode(&claims)?;
        storage.insert_session(&user.id, &token, expires_at)?;
        debug!(user_id = %user.id, role = %user.role, "session issued");
        Ok(LoginOutcome { token, user })
    }

    /// Revoke a token. Idempotent; returns whether a live session existed.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn logout(&self, storage: &mut SqliteStorage, token: &str) -> Result<bool> {
        storage.delete_session(token)
    }

    /// Resolve a bearer token to an identity.
    ///
    /// Fails with [`CivicError::MissingToken`] when no token is presented,
    /// [`CivicError::InvalidToken`] when the signature or structure is
    /// wrong, and [`CivicError::SessionExpired`] when the token is expired
    /// or its ledger row is gone.
    ///
    /// # Errors
    ///
    /// See above; also storage failures.
    pub fn authenticate(
        &self,
        storage: &SqliteStorage,
        token: Option<&str>,
    ) -> Result<Identity> {
        let token = token.ok_or(CivicError::MissingToken)?;
        let claims = self.codec.decode(token)?;

        let Some(session) = storage.find_session(token)? else {
            return Err(CivicError::SessionExpired);
        };
        if session.is_expired_at(Utc::now()) {
            return Err(CivicError::SessionExpired);
        }
        let Some(user) = storage.get_user(&claims.sub)? else {
            // Account removed since the token was issued
            return Err(CivicError::SessionExpired);
        };

        Ok(Identity {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }

    /// Require the identity to hold one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::Forbidden`] naming the allowed roles.
    pub fn authorize(&self, identity: &Identity, allowed: &[Role]) -> Result<()> {
        if allowed.contains(&identity.role) {
            return Ok(());
        }
        let required = allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Err(CivicError::Forbidden { required })
    }

    /// Replace a user's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::InvalidCredentials`] if the current password
    /// does not match, a validation error for a weak replacement, or an
    /// error on storage failure.
    pub fn change_password(
        &self,
        storage: &mut SqliteStorage,
        user_id: &str,
        current: &str,
        replacement: &str,
    ) -> Result<()> {
        let user = storage
            .get_user(user_id)?
            .ok_or_else(|| CivicError::UserNotFound {
                id: user_id.to_string(),
            })?;
        if !verify_password(current, &user.password_hash)? {
            return Err(CivicError::InvalidCredentials);
        }
        if replacement.len() < 8 {
            return Err(CivicError::validation(
                "password",
                "must be at least 8 characters",
            ));
        }
        let hash = hash_password(replacement)?;
        storage.set_password_hash(user_id, &hash)
    }
}
