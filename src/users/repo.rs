use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::users::model::User;

/// Persistence collaborator for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Users ordered by id.
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<User>>;

    /// Inserts when `user.id` is `None`, updates otherwise.
    async fn save(&self, user: User) -> AppResult<User>;

    async fn remove(&self, user: &User) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(e: sqlx::Error, email: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::DuplicateEmail(email.to_string())
        }
        _ => AppError::Database(e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, roles
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, roles
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, roles
            FROM users
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let saved = match user.id {
            None => sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (email, password_hash, roles)
                VALUES ($1, $2, $3)
                RETURNING id, email, password_hash, roles
                "#,
            )
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.roles)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_write_error(e, &user.email))?,
            Some(id) => sqlx::query_as::<_, User>(
                r#"
                UPDATE users
                SET email = $2, password_hash = $3, roles = $4
                WHERE id = $1
                RETURNING id, email, password_hash, roles
                "#,
            )
            .bind(id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.roles)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| map_write_error(e, &user.email))?
            .ok_or(AppError::NotFound)?,
        };
        debug!(user_id = ?saved.id, "user row written");
        Ok(saved)
    }

    async fn remove(&self, user: &User) -> AppResult<()> {
        let id = user.id.ok_or(AppError::NotFound)?;
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        debug!(user_id = id, "user row deleted");
        Ok(())
    }
}

#[cfg(test)]
pub use memory::InMemoryUserRepository;
