use crate::types::SessionSettings;
use secrecy::{ExposeSecret, SecretString};

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CredentialsError {
        #[error("No admin password hash configured")]
        MissingPasswordHash,

        #[error("Invalid admin password hash: {0}")]
        InvalidPasswordHash(#[from] blake3::HexError),
    }
}

use error::CredentialsError;

/// Decides whether a username/password pair may open an admin session.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &SecretString) -> bool;
}

impl<F> CredentialVerifier for F
where
    F: Fn(&str, &SecretString) -> bool + Send + Sync,
{
    fn verify(&self, username: &str, password: &SecretString) -> bool {
        self(username, password)
    }
}

/// A single fixed administrator identity.
///
/// Only the blake3 digest of the password is kept.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password_hash: blake3::Hash,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: &SecretString) -> Self {
        Self::from_hash(username, hash_password(password))
    }

    pub fn from_hash(username: impl Into<String>, password_hash: blake3::Hash) -> Self {
        Self {
            username: username.into(),
            password_hash,
        }
    }

    pub fn from_settings(settings: &SessionSettings) -> Result<Self, CredentialsError> {
        let hex = settings
            .admin_password_blake3
            .as_deref()
            .ok_or(CredentialsError::MissingPasswordHash)?;
        let password_hash = blake3::Hash::from_hex(hex)?;
        Ok(Self::from_hash(settings.admin_username.clone(), password_hash))
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &SecretString) -> bool {
        // blake3::Hash equality is constant-time
        let password_matches = hash_password(password) == self.password_hash;
        let username_matches = username == self.username;
        password_matches & username_matches
    }
}

/// Hex digest suitable for `session.admin_password_blake3` in config.toml.
pub fn password_hash_hex(password: &SecretString) -> String {
    hash_password(password).to_hex().to_string()
}

fn hash_password(password: &SecretString) -> blake3::Hash {
    blake3::hash(password.expose_secret().as_bytes())
}
