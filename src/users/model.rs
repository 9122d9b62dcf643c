use sqlx::FromRow;

/// Role every authenticated user carries, whether stored or not.
pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// User record in the database.
#[derive(Clone, Default, FromRow)]
pub struct User {
    pub id: Option<i64>,     // assigned by storage on first save
    pub email: String,       // login identifier, unique
    pub password_hash: String,
    pub roles: Vec<String>,  // stored roles, without the implicit ROLE_USER
    #[sqlx(skip)]
    pub plain_password: Option<String>, // request-scoped, never persisted
}

impl User {
    pub fn new(email: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            email: email.into(),
            roles,
            ..Self::default()
        }
    }

    /// Stored roles plus `ROLE_USER`, first occurrence wins.
    pub fn effective_roles(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.roles.len() + 1);
        for role in self.roles.iter().map(String::as_str).chain([ROLE_USER]) {
            if !out.iter().any(|r| r == role) {
                out.push(role.to_string());
            }
        }
        out
    }

    pub fn identifier(&self) -> &str {
        &self.email
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }

    pub fn erase_credentials(&mut self) {
        self.plain_password = None;
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("password_hash", &"<redacted>")
            .field("plain_password", &self.plain_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
