use serde::{Deserialize, Serialize};

use crate::database::User;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Public view of a user, nested inside tea views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserRegistration {
    pub fn validate(&self) -> Result<(), String> {
        validate_username_format(&self.username)?;
        validate_email_format(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserLogin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: String,
}

/// Usernames: 3-50 characters of letters, digits, `_` or `-`, starting with
/// a letter or digit.
pub fn validate_username_format(username: &str) -> Result<(), String> {
    let Some(first) = username.chars().next() else {
        return Err("Username cannot be empty".to_string());
    };

    let length = username.chars().count();
    if length < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if length > 50 {
        return Err("Username must be less than 50 characters".to_string());
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    if !first.is_alphanumeric() {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err("Invalid email format".to_string());
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username_format("testUser123").is_ok());
        assert!(validate_username_format("tea_lover-9").is_ok());
        assert!(validate_username_format("").is_err());
        assert!(validate_username_format("ab").is_err());
        assert!(validate_username_format("_leading").is_err());
        assert!(validate_username_format("has space").is_err());
        assert!(validate_username_format(&"x".repeat(51)).is_err());
    }

    #[test]
    fn username_length_counts_characters() {
        assert!(validate_username_format("éé").is_err());
        assert!(validate_username_format("éèê").is_ok());
        assert!(validate_username_format(&"é".repeat(50)).is_ok());
        assert!(validate_username_format(&"é".repeat(51)).is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email_format("hello@example.com").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("no-at-sign.com").is_err());
        assert!(validate_email_format("@example.com").is_err());
        assert!(validate_email_format("a@b@example.com").is_err());
        assert!(validate_email_format("user@localhost").is_err());
        assert!(validate_email_format("user@.com").is_err());
    }

    #[test]
    fn registration_checks_password_length() {
        let mut reg = UserRegistration {
            username: "testUser123".into(),
            email: "hello@example.com".into(),
            password: "short".into(),
        };
        assert!(reg.validate().is_err());

        reg.password = "mys3cretp2ssw0rd".into();
        assert!(reg.validate().is_ok());
    }
}
