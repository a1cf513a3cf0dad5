//! Credential Input Validation
//!
//! Turns the optional request fields into validated value objects,
//! reporting every failing field at once.

use kernel::error::field::FieldError;

use super::user_name::UserName;
use super::user_password::RawPassword;

/// Body field carrying the user name
pub const USER_NAME_FIELD: &str = "username";

/// Validated user name and password pair
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_name: UserName,
    pub password: RawPassword,
}

impl Credentials {
    /// Validate both fields. `password_field` names the body field the
    /// password came from (`password` or `newPassword`) for error reports.
    pub fn parse(
        user_name: Option<String>,
        password: Option<String>,
        password_field: &'static str,
    ) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let user_name = match user_name.map(UserName::new) {
            None => {
                errors.push(FieldError::body(USER_NAME_FIELD, "username is required"));
                None
            }
            Some(Err(e)) => {
                errors.push(FieldError::body(USER_NAME_FIELD, e.to_string()));
                None
            }
            Some(Ok(name)) => Some(name),
        };

        let password = match password.map(RawPassword::new) {
            None => {
                errors.push(FieldError::body(
                    password_field,
                    format!("{password_field} is required"),
                ));
                None
            }
            Some(Err(e)) => {
                errors.push(FieldError::body(password_field, e.to_string()));
                None
            }
            Some(Ok(password)) => Some(password),
        };

        match (user_name, password) {
            (Some(user_name), Some(password)) if errors.is_empty() => Ok(Self {
                user_name,
                password,
            }),
            _ => Err(errors),
        }
    }
}
