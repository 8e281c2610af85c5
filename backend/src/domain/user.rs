//! Team member data model.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Minimum allowed length for a full name.
pub const FULL_NAME_MIN: usize = 2;
/// Maximum allowed length for a full name.
pub const FULL_NAME_MAX: usize = 80;

/// Validation errors returned by user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("full name must not be empty")]
    EmptyFullName,
    #[error("full name must be between {min} and {max} characters")]
    FullNameLength { min: usize, max: usize },
    #[error("phone number may only contain digits, spaces, dashes and a leading +")]
    InvalidPhone,
    #[error("unknown user role: {0}")]
    UnknownRole(String),
    #[error("unknown user status: {0}")]
    UnknownStatus(String),
}

/// Trimmed, length-checked person name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a [`FullName`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        let length = trimmed.chars().count();
        if !(FULL_NAME_MIN..=FULL_NAME_MAX).contains(&length) {
            return Err(UserValidationError::FullNameLength {
                min: FULL_NAME_MIN,
                max: FULL_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Contact phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a [`PhoneNumber`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if !phone_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidPhone);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Job role of a team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    TeamLead,
    Technician,
    Driver,
}

impl UserRole {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::TeamLead => "team_lead",
            Self::Technician => "technician",
            Self::Driver => "driver",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "team_lead" => Ok(Self::TeamLead),
            "technician" => Ok(Self::Technician),
            "driver" => Ok(Self::Driver),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Availability of a team member.
///
/// `OnAssignment` is owned by status synchronisation; `OnLeave` and
/// `Unavailable` are manual states that synchronisation only overrides while
/// the user is on an active assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Available,
    OnAssignment,
    OnLeave,
    Unavailable,
}

impl UserStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 4] = [
        Self::Available,
        Self::OnAssignment,
        Self::OnLeave,
        Self::Unavailable,
    ];

    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnAssignment => "on_assignment",
            Self::OnLeave => "on_leave",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UserValidationError::UnknownStatus(s.to_owned()))
    }
}

/// Team member.
///
/// ## Invariants
/// - `full_name` is trimmed and within [`FULL_NAME_MIN`]..=[`FULL_NAME_MAX`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    full_name: FullName,
    role: UserRole,
    phone: Option<PhoneNumber>,
    status: UserStatus,
}

impl User {
    /// Build a user from validated components.
    pub fn new(
        id: UserId,
        full_name: FullName,
        role: UserRole,
        phone: Option<PhoneNumber>,
        status: UserStatus,
    ) -> Self {
        Self {
            id,
            full_name,
            role,
            phone,
            status,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Name shown in team listings.
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Job role.
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Optional contact number.
    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Current availability.
    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// Return a copy with the given availability.
    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    /// Apply a partial update.
    #[must_use]
    pub fn apply(mut self, patch: UserPatch) -> Self {
        let UserPatch {
            full_name,
            role,
            phone,
        } = patch;
        if let Some(full_name) = full_name {
            self.full_name = full_name;
        }
        if let Some(role) = role {
            self.role = role;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        self
    }
}

/// Partial update for a user. `phone: Some(None)` clears the number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub full_name: Option<FullName>,
    pub role: Option<UserRole>,
    pub phone: Option<Option<PhoneNumber>>,
}
