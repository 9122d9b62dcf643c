use std::sync::Arc;

use tracing::debug;

use crate::{
    auth::password::UserPasswordHasher,
    error::AppResult,
    users::{model::User, policy::Operation, repo::UserRepository},
};

/// Save hook for user writes: hashes a supplied plain password before the record
/// reaches storage, and sends deletes straight to removal.
#[derive(Clone)]
pub struct UserProcessor {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn UserPasswordHasher>,
}

impl UserProcessor {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn UserPasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Returns the stored record for writes and `None` for deletes.
    pub async fn process(&self, mut user: User, operation: Operation) -> AppResult<Option<User>> {
        if operation.is_delete() {
            self.users.remove(&user).await?;
            return Ok(None);
        }

        if let Some(plain) = user.plain_password.as_deref().filter(|p| !p.is_empty()) {
            user.password_hash = self.hasher.hash(&user, plain)?;
            user.erase_credentials();
            debug!(user_id = ?user.id, %operation, "password hashed");
        }

        let saved = self.users.save(user).await?;
        Ok(Some(saved))
    }
}
