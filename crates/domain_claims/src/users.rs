//! Application users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::UserId;

use crate::validation::ValidationResult;

/// A user able to log in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// PHC-formatted password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A user to be created, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new_v7(),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            is_active: true,
            created_at: now,
        }
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration checks that need no store
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirmation: &str,
) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let username = username.trim();
    if username.is_empty() {
        result.add_error("username", "This field is required.");
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        result.add_error(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        result.add_error("email", "Enter a valid email address.");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        result.add_error(
            "password",
            format!("This password is too short. It must contain at least {} characters.", MIN_PASSWORD_LENGTH),
        );
    }
    if password != confirmation {
        result.add_error("password_confirmation", "The two password fields didn't match.");
    }
    result
}
