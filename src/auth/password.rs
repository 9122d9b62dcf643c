use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::users::model::User;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Password hashing collaborator used by the save hook and the login flow.
///
/// The user is passed along so an implementation can pick per-user parameters;
/// `Argon2Hasher` ignores it.
pub trait UserPasswordHasher: Send + Sync {
    fn hash(&self, user: &User, plain: &str) -> anyhow::Result<String>;

    fn verify(&self, user: &User, plain: &str) -> anyhow::Result<bool>;
}

/// Argon2id with the crate's default cost parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl UserPasswordHasher for Argon2Hasher {
    fn hash(&self, _user: &User, plain: &str) -> anyhow::Result<String> {
        hash_password(plain)
    }

    fn verify(&self, user: &User, plain: &str) -> anyhow::Result<bool> {
        verify_password(plain, &user.password_hash)
    }
}
