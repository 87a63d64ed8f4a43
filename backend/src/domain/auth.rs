//! Registration and login inputs.
//!
//! Passwords are wrapped in [`Zeroizing`] so plaintext is wiped once the
//! credentials are dropped after hashing or verification.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, UserValidationError, Username};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length accepted at registration.
pub const PASSWORD_MAX: usize = 128;

/// Validation failures for authentication payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Username or email failed validation.
    Identity(UserValidationError),
    /// Password was empty.
    EmptyPassword,
    /// Password length outside the accepted range.
    PasswordLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
}

impl AuthValidationError {
    /// Payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Identity(inner) => inner.field(),
            Self::EmptyPassword | Self::PasswordLength { .. } => "password",
        }
    }
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(inner) => fmt::Display::fmt(inner, f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordLength { min, max } => {
                write!(f, "password must be between {min} and {max} characters")
            }
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<UserValidationError> for AuthValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::Identity(value)
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use questlog::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Hero@Example.com", "hunter22").expect("valid");
/// assert_eq!(creds.email().as_str(), "hero@example.com");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    ///
    /// Only emptiness is checked for the password; length rules apply at
    /// registration so older accounts can still log in.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password as provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw registration inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        let username = Username::new(username)?;
        let email = Email::new(email)?;
        let length = password.chars().count();
        if length == 0 {
            return Err(AuthValidationError::EmptyPassword);
        }
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(AuthValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plaintext password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
