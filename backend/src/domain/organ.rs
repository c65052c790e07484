//! Organ type and urgency value objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Organ categories the registry accepts for requests and donations.
///
/// Matching requires exact equality between a request's and a donation's
/// organ type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganType {
    Heart,
    Kidney,
    Liver,
    Lung,
    Pancreas,
    Cornea,
}

impl OrganType {
    /// Canonical lower-case identifier used in storage and the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::Kidney => "kidney",
            Self::Liver => "liver",
            Self::Lung => "lung",
            Self::Pancreas => "pancreas",
            Self::Cornea => "cornea",
        }
    }
}

impl fmt::Display for OrganType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`OrganType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOrganTypeError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseOrganTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid organ type: {}", self.input)
    }
}

impl std::error::Error for ParseOrganTypeError {}

impl FromStr for OrganType {
    type Err = ParseOrganTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "heart" => Ok(Self::Heart),
            "kidney" => Ok(Self::Kidney),
            "liver" => Ok(Self::Liver),
            "lung" => Ok(Self::Lung),
            "pancreas" => Ok(Self::Pancreas),
            "cornea" => Ok(Self::Cornea),
            _ => Err(ParseOrganTypeError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Lowest urgency a patient may declare.
pub const URGENCY_MIN: u8 = 1;
/// Highest urgency a patient may declare.
pub const URGENCY_MAX: u8 = 5;

/// Clinical urgency of an organ request, constrained to 1–5.
///
/// ## Invariants
/// - The wrapped value is always within [`URGENCY_MIN`]..=[`URGENCY_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Urgency(u8);

/// Validation error returned by [`Urgency::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrgencyError {
    /// The rejected value.
    pub value: u8,
}

impl fmt::Display for UrgencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "urgency must be between {URGENCY_MIN} and {URGENCY_MAX}, got {}",
            self.value
        )
    }
}

impl std::error::Error for UrgencyError {}

impl Urgency {
    /// Validate and construct an [`Urgency`].
    ///
    /// # Examples
    /// ```
    /// use transplant_registry::domain::Urgency;
    ///
    /// assert!(Urgency::new(5).is_ok());
    /// assert!(Urgency::new(6).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self, UrgencyError> {
        if (URGENCY_MIN..=URGENCY_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(UrgencyError { value })
        }
    }

    /// The wrapped urgency value.
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Urgency> for u8 {
    fn from(value: Urgency) -> Self {
        value.0
    }
}

impl TryFrom<u8> for Urgency {
    type Error = UrgencyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
