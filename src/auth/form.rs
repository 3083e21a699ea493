//! Request bodies for the account endpoints and the rules that check them.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    Error,
    email::Email,
    validation::{FieldError, collect_errors, optional_string, required_string, trimmed_length},
};

use super::password::ValidatedPassword;

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;

fn name_rule(value: Option<&Value>) -> Result<String, FieldError> {
    required_string("name", value, "Name").and_then(|name| {
        trimmed_length("name", name, MIN_NAME_LENGTH, MAX_NAME_LENGTH, "Name")
    })
}

fn email_rule(value: Option<&Value>) -> Result<Email, FieldError> {
    required_string("email", value, "Email").and_then(|email| {
        Email::new(email).map_err(|_| FieldError::new("email", "Please provide a valid email"))
    })
}

fn new_password_rule(
    field: &str,
    value: Option<&Value>,
    label: &str,
) -> Result<ValidatedPassword, FieldError> {
    required_string(field, value, label).and_then(|password| {
        ValidatedPassword::new(password).map_err(|error| FieldError::new(field, error.to_string()))
    })
}

/// The JSON body for `POST /api/auth/register`.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
}

/// A registration that passed validation. The password still needs hashing.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: ValidatedPassword,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns [Error::Validation] listing every field that broke a rule.
    pub fn into_registration(self) -> Result<Registration, Error> {
        let name = name_rule(self.name.as_ref());
        let email = email_rule(self.email.as_ref());
        let password = new_password_rule("password", self.password.as_ref(), "Password");

        match (name, email, password) {
            (Ok(name), Ok(email), Ok(password)) => Ok(Registration {
                name,
                email,
                password,
            }),
            (name, email, password) => Err(Error::Validation(collect_errors([
                name.err(),
                email.err(),
                password.err(),
            ]))),
        }
    }
}

/// The JSON body for `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LogInForm {
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
}

/// The email and plain text password a user is trying to log in with.
#[derive(Debug)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

impl LogInForm {
    /// # Errors
    ///
    /// Returns [Error::Validation] if the email is malformed or the password is missing.
    pub fn into_credentials(self) -> Result<Credentials, Error> {
        let email = email_rule(self.email.as_ref());
        let password = required_string("password", self.password.as_ref(), "Password");

        match (email, password) {
            (Ok(email), Ok(password)) => Ok(Credentials {
                email,
                password: password.to_owned(),
            }),
            (email, password) => Err(Error::Validation(collect_errors([
                email.err(),
                password.err(),
            ]))),
        }
    }
}

/// The JSON body for `PUT /api/auth/profile`.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

/// The profile fields to change. At least one is set.
#[derive(Debug, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns [Error::Validation] if a sent field is invalid or no field was sent.
    pub fn into_update(self) -> Result<ProfileUpdate, Error> {
        let name = match optional_string("name", self.name.as_ref(), "Name") {
            Ok(Some(_)) => name_rule(self.name.as_ref()).map(Some),
            Ok(None) => Ok(None),
            Err(error) => Err(error),
        };
        let email = match optional_string("email", self.email.as_ref(), "Email") {
            Ok(Some(_)) => email_rule(self.email.as_ref()).map(Some),
            Ok(None) => Ok(None),
            Err(error) => Err(error),
        };

        match (name, email) {
            (Ok(None), Ok(None)) => Err(Error::Validation(vec![FieldError::new(
                "body",
                "At least one field must be provided to update",
            )])),
            (Ok(name), Ok(email)) => Ok(ProfileUpdate { name, email }),
            (name, email) => Err(Error::Validation(collect_errors([
                name.err(),
                email.err(),
            ]))),
        }
    }
}

/// The JSON body for `PUT /api/auth/change-password`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub current_password: Option<Value>,
    #[serde(default)]
    pub new_password: Option<Value>,
}

#[derive(Debug)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: ValidatedPassword,
}

impl ChangePasswordForm {
    /// # Errors
    ///
    /// Returns [Error::Validation] if either password is missing, the new
    /// password breaks the policy or it is the same as the current one.
    pub fn into_password_change(self) -> Result<PasswordChange, Error> {
        let current_password = required_string(
            "currentPassword",
            self.current_password.as_ref(),
            "Current password",
        );
        let new_password = match (&current_password, self.new_password.as_ref()) {
            (Ok(current), Some(Value::String(new))) if *current == new.as_str() => {
                Err(FieldError::new(
                    "newPassword",
                    "New password must be different from the current password",
                ))
            }
            (_, new) => new_password_rule("newPassword", new, "New password"),
        };

        match (current_password, new_password) {
            (Ok(current_password), Ok(new_password)) => Ok(PasswordChange {
                current_password: current_password.to_owned(),
                new_password,
            }),
            (current_password, new_password) => Err(Error::Validation(collect_errors([
                current_password.err(),
                new_password.err(),
            ]))),
        }
    }
}
