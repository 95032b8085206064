//! Identifiers for domain entities
//!
//! Two families live here:
//!
//! - Internal identities: newtype wrappers around time-ordered UUIDs. They
//!   order by creation and never leave the persistence layer's control.
//! - Sequential codes: the human-readable `CL00001` / `CLM000001` codes and
//!   the per-client-per-day [`ClientReference`]. These embed a kind-specific
//!   prefix and fixed-width zero padding, so they cannot be delegated to a
//!   database auto-increment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new_v7()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(ClientId, "CLI");
define_id!(ShipmentId, "SHP");
define_id!(UserId, "USR");

/// The entity kinds that own an independent numeric sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Client,
    Claim,
}

impl SequenceKind {
    /// Key of the counter row for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceKind::Client => "client",
            SequenceKind::Claim => "claim",
        }
    }

    /// Highest value the fixed-width rendering can hold
    pub fn max_value(&self) -> u64 {
        match self {
            SequenceKind::Client => ClientCode::MAX,
            SequenceKind::Claim => ClaimCode::MAX,
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when an identifier cannot be produced
///
/// Callers treat these as hard failures of the enclosing write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("existing {kind} identifier '{value}' cannot be parsed")]
    Unparseable { kind: SequenceKind, value: String },

    #[error("{kind} identifier space exhausted at {max}")]
    Exhausted { kind: SequenceKind, max: u64 },

    #[error("{kind} sequence value {value} is out of range")]
    OutOfRange { kind: SequenceKind, value: i64 },
}

macro_rules! define_code {
    ($name:ident, $prefix:literal, $width:literal, $kind:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(u64);

        impl $name {
            pub const PREFIX: &'static str = $prefix;
            pub const WIDTH: usize = $width;
            pub const MAX: u64 = 10_u64.pow($width) - 1;

            /// The first code of the sequence
            pub fn first() -> Self {
                Self(1)
            }

            /// Builds the code for a sequence value
            pub fn from_sequence(value: u64) -> Result<Self, AllocationError> {
                if value > Self::MAX {
                    return Err(AllocationError::Exhausted { kind: $kind, max: Self::MAX });
                }
                if value == 0 {
                    return Err(AllocationError::OutOfRange { kind: $kind, value: 0 });
                }
                Ok(Self(value))
            }

            /// Parses a rendered code, rejecting anything that is not
            /// prefix followed by digits
            pub fn parse(value: &str) -> Result<Self, AllocationError> {
                let unparseable = || AllocationError::Unparseable {
                    kind: $kind,
                    value: value.to_string(),
                };
                let digits = value.strip_prefix($prefix).ok_or_else(unparseable)?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(unparseable());
                }
                let sequence: u64 = digits.parse().map_err(|_| unparseable())?;
                if sequence == 0 {
                    return Err(unparseable());
                }
                Self::from_sequence(sequence)
            }

            /// The code following this one
            pub fn next(&self) -> Result<Self, AllocationError> {
                Self::from_sequence(self.0 + 1)
            }

            /// Numeric sequence value
            pub fn sequence(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{:0width$}", $prefix, self.0, width = $width)
            }
        }

        impl FromStr for $name {
            type Err = AllocationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = AllocationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> String {
                code.to_string()
            }
        }
    };
}

define_code!(ClientCode, "CL", 5, SequenceKind::Client);
define_code!(ClaimCode, "CLM", 6, SequenceKind::Claim);

/// Maximum length of the client-name segment of a reference
pub const REFERENCE_NAME_MAX: usize = 15;

/// Strips everything that is not an ASCII letter or digit and truncates
/// to [`REFERENCE_NAME_MAX`] characters.
pub fn sanitize_client_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(REFERENCE_NAME_MAX)
        .collect()
}

/// Per-client-per-day reference: `{clean-name}-{n}-{YYYYMMDD}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientReference {
    name: String,
    number: u32,
    date: NaiveDate,
}

impl ClientReference {
    /// Creates a reference from an already sanitized name
    pub fn new(sanitized_name: impl Into<String>, number: u32, date: NaiveDate) -> Self {
        Self {
            name: sanitized_name.into(),
            number,
            date,
        }
    }

    /// Parses `name-number-YYYYMMDD`. The name segment may be empty.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.rsplitn(3, '-');
        let date = parts.next()?;
        let number = parts.next()?;
        let name = parts.next()?;
        let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
        let number = number.parse().ok()?;
        Some(Self::new(name, number, date))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// True when this reference belongs to `sanitized_name` on `date`
    pub fn is_for(&self, sanitized_name: &str, date: NaiveDate) -> bool {
        self.name == sanitized_name && self.date == date
    }

    /// Prefix shared by all references of a client (`name-`)
    pub fn name_prefix(sanitized_name: &str) -> String {
        format!("{}-", sanitized_name)
    }

    /// Suffix shared by all references of a day (`-YYYYMMDD`)
    pub fn date_suffix(date: NaiveDate) -> String {
        format!("-{}", date.format("%Y%m%d"))
    }
}

impl fmt::Display for ClientReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.number, self.date.format("%Y%m%d"))
    }
}

impl TryFrom<String> for ClientReference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid client reference '{}'", value))
    }
}

impl From<ClientReference> for String {
    fn from(reference: ClientReference) -> String {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_code_display() {
        assert_eq!(ClientCode::first().to_string(), "CL00001");
        assert_eq!(ClientCode::from_sequence(42).unwrap().to_string(), "CL00042");
    }

    #[test]
    fn test_claim_code_display() {
        assert_eq!(ClaimCode::first().to_string(), "CLM000001");
    }

    #[test]
    fn test_client_code_rejects_claim_code() {
        assert!(ClientCode::parse("CLM000001").is_err());
    }

    #[test]
    fn test_reference_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let reference = ClientReference::new("AcmeCorp", 2, date);
        assert_eq!(reference.to_string(), "AcmeCorp-2-20250601");
        assert_eq!(ClientReference::parse("AcmeCorp-2-20250601"), Some(reference));
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::now_v7();
        let id = ClientId::from(uuid);
        let back: Uuid = id.into();
        assert_eq!(uuid, back);
    }
}
