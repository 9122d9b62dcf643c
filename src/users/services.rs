use anyhow::Context;
use tracing::{debug, info};

use crate::{
    config::BootstrapAdmin,
    users::{
        dto::CreateUserRequest,
        model::ROLE_ADMIN,
        policy::Operation,
        processor::UserProcessor,
        repo::UserRepository,
    },
};

/// Creates the configured administrator unless a user with that email exists.
///
/// The credentials go through the same validation as `POST /users`, so a weak
/// password fails startup even when the account already exists.
pub async fn ensure_bootstrap_admin(
    users: &dyn UserRepository,
    processor: &UserProcessor,
    admin: &BootstrapAdmin,
) -> anyhow::Result<()> {
    let user = CreateUserRequest {
        email: Some(admin.email.clone()),
        roles: vec![ROLE_ADMIN.to_string()],
        plain_password: Some(admin.password.clone()),
    }
    .into_user()
    .context("invalid bootstrap admin credentials")?;

    let email = user.email.clone();
    if users
        .find_by_email(&email)
        .await
        .context("look up bootstrap admin")?
        .is_some()
    {
        debug!(email = %email, "bootstrap admin already present");
        return Ok(());
    }

    let saved = processor
        .process(user, Operation::Create)
        .await
        .context("create bootstrap admin")?;
    if let Some(saved) = saved {
        info!(user_id = ?saved.id, email = %saved.email, "bootstrap admin created");
    }
    Ok(())
}
