//! User identity and account primitives.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for user identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The id was not a UUID.
    InvalidId,
    /// Username length outside the allowed range.
    UsernameLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// Username contains characters other than letters, digits, underscores.
    UsernameCharacters,
    /// Email is not a plausible address.
    InvalidEmail,
    /// Email exceeds the storage limit.
    EmailTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl UserValidationError {
    /// Payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::UsernameLength { .. } | Self::UsernameCharacters => "username",
            Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::UsernameLength { min, max } => {
                write!(f, "username must be between {min} and {max} characters")
            }
            Self::UsernameCharacters => write!(
                f,
                "username may only contain letters, numbers, and underscores"
            ),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Minimum username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length.
pub const USERNAME_MAX: usize = 50;
/// Maximum email length.
pub const EMAIL_MAX: usize = 255;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| match Regex::new("^[A-Za-z0-9_]+$") {
        Ok(regex) => regex,
        Err(error) => panic!("username regex failed to compile: {error}"),
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        match Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$") {
            Ok(regex) => regex,
            Err(error) => panic!("email regex failed to compile: {error}"),
        }
    })
}

/// Public handle chosen by the user.
///
/// # Examples
/// ```
/// use questlog::domain::Username;
///
/// assert!(Username::new("quest_hero").is_ok());
/// assert!(Username::new("no spaces").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate a username after trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the username.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Login email, normalised to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Borrow the address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persisted account as seen by the domain.
///
/// `level` is a cache of `level_for(total XP)`; it is only written inside the
/// XP award transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account identifier.
    pub id: UserId,
    /// Public handle.
    pub username: Username,
    /// Login email.
    pub email: Email,
    /// Cached level.
    pub level: u32,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Data required to create an account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Identifier chosen by the service.
    pub id: UserId,
    /// Public handle.
    pub username: Username,
    /// Login email.
    pub email: Email,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Creation time from the service clock.
    pub created_at: DateTime<Utc>,
}

/// Account row plus the stored password hash, used only for login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    /// Account the hash belongs to.
    pub user: User,
    /// PHC-formatted password hash.
    pub password_hash: String,
}
