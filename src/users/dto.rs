use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::users::model::User;

const MIN_LEN: usize = 6;
const MAX_LEN: usize = 180;

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserRead {
    pub id: i64,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<&User> for UserRead {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            email: user.email.clone(),
            roles: user.effective_roles(),
        }
    }
}

/// Request body for `POST /users`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub plain_password: Option<String>,
}

/// Request body for `PUT /users/:id`. Roles cannot be changed here.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub plain_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: i64,
}
fn default_page() -> i64 {
    1
}
fn default_items_per_page() -> i64 {
    30
}

impl Pagination {
    /// `(limit, offset)` with the page size clamped to 1..=100.
    pub fn limit_offset(&self) -> (i64, i64) {
        let limit = self.items_per_page.clamp(1, 100);
        let page = self.page.max(1);
        (limit, (page - 1).saturating_mul(limit))
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_length(field: &str, value: &str, violations: &mut Vec<String>) {
    let len = value.chars().count();
    if len < MIN_LEN {
        violations.push(format!(
            "{field}: this value is too short, it should have {MIN_LEN} characters or more"
        ));
    } else if len > MAX_LEN {
        violations.push(format!(
            "{field}: this value is too long, it should have {MAX_LEN} characters or less"
        ));
    }
}

fn check_email(email: &str, violations: &mut Vec<String>) {
    check_length("email", email, violations);
    if !is_valid_email(email) {
        violations.push("email: this value is not a valid email address".into());
    }
}

fn finish(violations: Vec<String>) -> AppResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violations.join("; ")))
    }
}

/// Treats an empty password as "not supplied".
fn non_empty(password: Option<String>) -> Option<String> {
    password.filter(|p| !p.is_empty())
}

impl CreateUserRequest {
    /// Validates the body and turns it into an unsaved record.
    pub fn into_user(self) -> AppResult<User> {
        let email = self.email.as_deref().map(normalize_email).unwrap_or_default();
        let plain_password = non_empty(self.plain_password);

        let mut violations = Vec::new();
        if email.is_empty() {
            violations.push("email: this value should not be blank".into());
        } else {
            check_email(&email, &mut violations);
        }
        match &plain_password {
            Some(p) => check_length("plainPassword", p, &mut violations),
            None => violations.push("plainPassword: this value should not be blank".into()),
        }
        finish(violations)?;

        let mut user = User::new(email, self.roles);
        user.plain_password = plain_password;
        Ok(user)
    }
}

impl UpdateUserRequest {
    /// Validates the body and applies it on top of the stored record.
    pub fn apply_to(self, mut user: User) -> AppResult<User> {
        let email = self.email.as_deref().map(normalize_email);
        let plain_password = non_empty(self.plain_password);

        let mut violations = Vec::new();
        if let Some(email) = &email {
            check_email(email, &mut violations);
        }
        if let Some(p) = &plain_password {
            check_length("plainPassword", p, &mut violations);
        }
        finish(violations)?;

        if let Some(email) = email {
            user.email = email;
        }
        user.plain_password = plain_password;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::model::{ROLE_ADMIN, ROLE_USER};

    fn create(email: &str, password: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            email: Some(email.into()),
            roles: vec![],
            plain_password: password.map(str::to_string),
        }
    }

    #[test]
    fn create_normalizes_email_and_keeps_password() {
        let user = create("  A@Example.COM ", Some("secret1")).into_user().unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.plain_password.as_deref(), Some("secret1"));
        assert!(user.id.is_none());
        assert!(user.password_hash.is_empty());
    }

    #[test]
    fn create_rejects_bad_email() {
        let err = create("not-an-email", Some("secret1")).into_user().unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("valid email")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn create_rejects_short_email() {
        let err = create("a@b.c", Some("secret1")).into_user().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("too short")));
    }

    #[test]
    fn create_rejects_long_email() {
        let email = format!("{}@example.com", "a".repeat(180));
        let err = create(&email, Some("secret1")).into_user().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("too long")));
    }

    #[test]
    fn create_requires_password() {
        let err = create("a@example.com", None).into_user().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("plainPassword")));
        let err = create("a@example.com", Some("")).into_user().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("plainPassword")));
    }

    #[test]
    fn create_reports_every_violation() {
        let err = create("bad", Some("123")).into_user().unwrap_err();
        let AppError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("email"));
        assert!(msg.contains("plainPassword"));
    }

    #[test]
    fn create_body_uses_camel_case() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"email":"a@example.com","roles":["ROLE_ADMIN"],"plainPassword":"secret1"}"#,
        )
        .unwrap();
        let user = req.into_user().unwrap();
        assert_eq!(user.roles, vec![ROLE_ADMIN.to_string()]);
        assert_eq!(user.plain_password.as_deref(), Some("secret1"));
    }

    #[test]
    fn update_ignores_roles_field() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"roles":["ROLE_ADMIN"],"plainPassword":"newpass"}"#).unwrap();
        let stored = User::new("a@example.com", vec![]);
        let user = req.apply_to(stored).unwrap();
        assert!(user.roles.is_empty());
        assert_eq!(user.plain_password.as_deref(), Some("newpass"));
    }

    #[test]
    fn update_with_empty_password_leaves_it_unset() {
        let mut stored = User::new("a@example.com", vec![]);
        stored.password_hash = "existing".into();
        let req = UpdateUserRequest {
            email: Some("b@example.com".into()),
            plain_password: Some(String::new()),
        };
        let user = req.apply_to(stored).unwrap();
        assert_eq!(user.email, "b@example.com");
        assert!(user.plain_password.is_none());
        assert_eq!(user.password_hash, "existing");
    }

    #[test]
    fn update_rejects_short_password() {
        let req = UpdateUserRequest {
            email: None,
            plain_password: Some("12345".into()),
        };
        let err = req.apply_to(User::new("a@example.com", vec![])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn user_read_exposes_effective_roles_only() {
        let mut user = User::new("a@example.com", vec![]);
        user.id = Some(7);
        user.password_hash = "hash".into();
        let json = serde_json::to_value(UserRead::from(&user)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "email": "a@example.com", "roles": [ROLE_USER]})
        );
    }

    #[test]
    fn pagination_clamps_page_size() {
        let p = Pagination { page: 3, items_per_page: 10 };
        assert_eq!(p.limit_offset(), (10, 20));
        let p = Pagination { page: 0, items_per_page: 1000 };
        assert_eq!(p.limit_offset(), (100, 0));
    }

    #[test]
    fn pagination_saturates_on_huge_page() {
        let p = Pagination { page: i64::MAX, items_per_page: 30 };
        let (limit, offset) = p.limit_offset();
        assert_eq!(limit, 30);
        assert_eq!(offset, i64::MAX);
    }

    #[test]
    fn create_reports_missing_email_with_other_violations() {
        let req: CreateUserRequest = serde_json::from_str(r#"{"plainPassword":"123"}"#).unwrap();
        let AppError::Validation(msg) = req.into_user().unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(msg.contains("email: this value should not be blank"));
        assert!(msg.contains("plainPassword: this value is too short"));
    }

    #[test]
    fn email_regex() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user example@x.com"));
    }
}
