//! Participant identity and role model.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by participant constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantValidationError {
    EmptyName,
    NameTooShort { min: usize },
    NameTooLong { max: usize },
    NameInvalidCharacters,
}

impl fmt::Display for ParticipantValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "participant name must not be empty"),
            Self::NameTooShort { min } => {
                write!(f, "participant name must be at least {min} characters")
            }
            Self::NameTooLong { max } => {
                write!(f, "participant name must be at most {max} characters")
            }
            Self::NameInvalidCharacters => write!(
                f,
                "participant name may only contain letters, numbers, spaces, underscores, or hyphens",
            ),
        }
    }
}

impl std::error::Error for ParticipantValidationError {}

/// Stable participant identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(value)?))
    }
}

/// Registry role of a participant.
///
/// Roles gate state-machine transitions: only [`Role::Doctor`] and
/// [`Role::Admin`] may advance a request or donation past its creation
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Donor,
    Doctor,
    Admin,
}

impl Role {
    /// Canonical lower-case identifier used in storage and the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Donor => "donor",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }

    /// Whether this role may adjudicate transitions (approve, reject,
    /// verify, match, complete).
    pub fn can_adjudicate(&self) -> bool {
        matches!(self, Self::Doctor | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`Role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid role: {}", self.input)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "patient" => Ok(Self::Patient),
            "donor" => Ok(Self::Donor),
            "doctor" => Ok(Self::Doctor),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Minimum allowed length for a participant name.
pub const PARTICIPANT_NAME_MIN: usize = 3;
/// Maximum allowed length for a participant name.
pub const PARTICIPANT_NAME_MAX: usize = 64;

static PARTICIPANT_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn participant_name_regex() -> &'static Regex {
    PARTICIPANT_NAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[A-Za-z0-9_ -]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("participant name regex failed to compile: {error}"))
    })
}

/// Human readable name for a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantName(String);

impl ParticipantName {
    /// Validate and construct a [`ParticipantName`] from owned input.
    pub fn new(name: impl Into<String>) -> Result<Self, ParticipantValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, ParticipantValidationError> {
        if name.trim().is_empty() {
            return Err(ParticipantValidationError::EmptyName);
        }

        let length = name.chars().count();
        if length < PARTICIPANT_NAME_MIN {
            return Err(ParticipantValidationError::NameTooShort {
                min: PARTICIPANT_NAME_MIN,
            });
        }
        if length > PARTICIPANT_NAME_MAX {
            return Err(ParticipantValidationError::NameTooLong {
                max: PARTICIPANT_NAME_MAX,
            });
        }

        if !participant_name_regex().is_match(&name) {
            return Err(ParticipantValidationError::NameInvalidCharacters);
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for ParticipantName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ParticipantName> for String {
    fn from(value: ParticipantName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ParticipantName {
    type Error = ParticipantValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Registered participant.
///
/// Created at registration and never deleted. The `verified` flag is the
/// doctor-confirmed identity check and may only be flipped by an
/// adjudicating role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    id: ParticipantId,
    name: ParticipantName,
    role: Role,
    verified: bool,
    created_at: DateTime<Utc>,
}

impl Participant {
    /// Register a new, unverified participant.
    pub fn register(name: ParticipantName, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ParticipantId::random(),
            name,
            role,
            verified: false,
            created_at,
        }
    }

    /// Rebuild a participant from already-persisted parts.
    pub fn from_parts(
        id: ParticipantId,
        name: ParticipantName,
        role: Role,
        verified: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            role,
            verified,
            created_at,
        }
    }

    /// Stable participant identifier.
    pub const fn id(&self) -> ParticipantId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &ParticipantName {
        &self.name
    }

    /// Registry role.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Doctor-confirmed identity flag.
    pub const fn verified(&self) -> bool {
        self.verified
    }

    /// Registration timestamp.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set the doctor-confirmed identity flag.
    pub fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("patient", Role::Patient)]
    #[case("donor", Role::Donor)]
    #[case("doctor", Role::Doctor)]
    #[case("admin", Role::Admin)]
    fn role_round_trips_through_str(#[case] raw: &str, #[case] role: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(role));
        assert_eq!(role.to_string(), raw);
    }

    #[rstest]
    #[case(Role::Patient, false)]
    #[case(Role::Donor, false)]
    #[case(Role::Doctor, true)]
    #[case(Role::Admin, true)]
    fn adjudication_is_limited_to_doctor_and_admin(#[case] role: Role, #[case] allowed: bool) {
        assert_eq!(role.can_adjudicate(), allowed);
    }

    #[rstest]
    #[case("", ParticipantValidationError::EmptyName)]
    #[case("ab", ParticipantValidationError::NameTooShort { min: PARTICIPANT_NAME_MIN })]
    #[case("Эви", ParticipantValidationError::NameInvalidCharacters)]
    fn invalid_names_are_rejected(
        #[case] raw: &str,
        #[case] expected: ParticipantValidationError,
    ) {
        assert_eq!(ParticipantName::new(raw), Err(expected));
    }

    #[rstest]
    fn overlong_name_is_rejected() {
        let raw = "a".repeat(PARTICIPANT_NAME_MAX + 1);
        assert_eq!(
            ParticipantName::new(raw),
            Err(ParticipantValidationError::NameTooLong {
                max: PARTICIPANT_NAME_MAX
            })
        );
    }

    #[rstest]
    fn registration_starts_unverified() {
        let name = ParticipantName::new("Ada Lovelace").expect("valid name");
        let participant = Participant::register(name, Role::Patient, chrono::Utc::now());

        assert!(!participant.verified());
        assert_eq!(participant.role(), Role::Patient);
    }

    #[rstest]
    fn verification_flag_can_be_set() {
        let name = ParticipantName::new("Grace Hopper").expect("valid name");
        let mut participant = Participant::register(name, Role::Donor, chrono::Utc::now());

        participant.set_verified(true);
        assert!(participant.verified());
    }
}
