use std::fmt;

use crate::error::{AppError, AppResult};
use crate::users::model::User;

/// Operations exposed on the user resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetOne,
    GetCollection,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn is_delete(self) -> bool {
        matches!(self, Operation::Delete)
    }

    pub fn denied_message(self) -> &'static str {
        match self {
            Operation::GetOne => "You can't get another user.",
            Operation::GetCollection => "Only admins can get all users.",
            Operation::Create => "Only admins can create new user.",
            Operation::Update => "You can't update another user.",
            Operation::Delete => "You can't delete another user.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::GetOne => "get",
            Operation::GetCollection => "get_collection",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

fn is_self(caller: &User, target: Option<&User>) -> bool {
    target.is_some_and(|t| t.identifier() == caller.identifier())
}

/// Whether `caller` may perform `operation`, optionally on an existing `target`.
pub fn is_granted(caller: &User, operation: Operation, target: Option<&User>) -> bool {
    match operation {
        Operation::GetOne => is_self(caller, target),
        Operation::GetCollection | Operation::Create => caller.is_admin(),
        Operation::Update | Operation::Delete => caller.is_admin() || is_self(caller, target),
    }
}

pub fn authorize(caller: &User, operation: Operation, target: Option<&User>) -> AppResult<()> {
    if is_granted(caller, operation, target) {
        Ok(())
    } else {
        Err(AppError::AccessDenied(operation.denied_message()))
    }
}
