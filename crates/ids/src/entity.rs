//! Entity identifiers for patients, doctors and clinics.
//!
//! Format: `PREFIX-YYYYMMDD-SEQUENCE-RANDOM`, for example `DOC-20250113-00045-1234`.

use crate::constants::{
    DATE_FIELD_WIDTH, ID_SEPARATOR, INVALID_ID_FORMAT, RANDOM_FIELD_WIDTH, SEQUENCE_FIELD_WIDTHS,
};
use crate::{IdError, IdResult};
use chrono::NaiveDate;
use std::ops::RangeInclusive;
use std::{fmt, str::FromStr};

/// The kinds of record that carry an entity ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntityType {
    Patient,
    Doctor,
    Clinic,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [EntityType::Patient, EntityType::Doctor, EntityType::Clinic];

    /// Three-letter prefix that opens every ID of this type.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityType::Patient => "PAT",
            EntityType::Doctor => "DOC",
            EntityType::Clinic => "CLN",
        }
    }

    /// Zero-pad width of the sequence field at generation time.
    ///
    /// This is a minimum, not a limit: a sequence with more digits is written out in full.
    pub fn sequence_width(self) -> usize {
        match self {
            EntityType::Patient => 6,
            EntityType::Doctor | EntityType::Clinic => 5,
        }
    }

    /// Looks up the entity type owning `prefix`. Matching is case-sensitive.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.prefix() == prefix)
    }

    /// Lowercase name used in configuration, JSON and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Patient => "patient",
            EntityType::Doctor => "doctor",
            EntityType::Clinic => "clinic",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = IdError;

    /// Accepts `patient`, `doctor` or `clinic` in any case, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                IdError::InvalidInput(format!(
                    "unknown entity type '{}', expected one of: patient, doctor, clinic",
                    s
                ))
            })
    }
}

/// Outcome of checking a string against the entity ID format.
///
/// Validation never fails; a malformed input yields `is_valid == false` with the error message
/// set and no entity type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntityIdValidation {
    pub is_valid: bool,
    pub entity_type: Option<EntityType>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

impl EntityIdValidation {
    fn valid(entity_type: EntityType) -> Self {
        Self {
            is_valid: true,
            entity_type: Some(entity_type),
            error: None,
        }
    }

    fn invalid() -> Self {
        Self {
            is_valid: false,
            entity_type: None,
            error: Some(INVALID_ID_FORMAT.to_string()),
        }
    }
}

/// The fields recovered from a valid entity ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntityIdParts {
    pub entity_type: EntityType,
    /// Generation date. `None` when the date field has the right shape but names no real day
    /// (for example `20251399`), which the validator does not catch.
    pub date: Option<NaiveDate>,
    pub sequence: u64,
    /// Collision-reduction noise; returned as-is and never interpreted.
    pub random: u32,
}

struct RawFields<'a> {
    entity_type: EntityType,
    date: &'a str,
    sequence: &'a str,
    random: &'a str,
}

fn is_digits(field: &str, widths: RangeInclusive<usize>) -> bool {
    widths.contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
}

// Shape check for `^(PAT|DOC|CLN)-(\d{8})-(\d{5,6})-(\d{4})$`. The sequence field accepts 5 or 6
// digits for every prefix.
fn split_fields(input: &str) -> Option<RawFields<'_>> {
    let mut fields = input.split(ID_SEPARATOR);
    let prefix = fields.next()?;
    let date = fields.next()?;
    let sequence = fields.next()?;
    let random = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let entity_type = EntityType::from_prefix(prefix)?;
    let shape_ok = is_digits(date, DATE_FIELD_WIDTH..=DATE_FIELD_WIDTH)
        && is_digits(sequence, SEQUENCE_FIELD_WIDTHS)
        && is_digits(random, RANDOM_FIELD_WIDTH..=RANDOM_FIELD_WIDTH);

    shape_ok.then_some(RawFields {
        entity_type,
        date,
        sequence,
        random,
    })
}

fn calendar_date(field: &str) -> Option<NaiveDate> {
    let year = field.get(0..4)?.parse().ok()?;
    let month = field.get(4..6)?.parse().ok()?;
    let day = field.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub(crate) fn validate(input: &str) -> EntityIdValidation {
    match split_fields(input) {
        Some(raw) => EntityIdValidation::valid(raw.entity_type),
        None => EntityIdValidation::invalid(),
    }
}

pub(crate) fn parse(input: &str) -> Option<EntityIdParts> {
    let raw = split_fields(input)?;
    Some(EntityIdParts {
        entity_type: raw.entity_type,
        date: calendar_date(raw.date),
        sequence: raw.sequence.parse().ok()?,
        random: raw.random.parse().ok()?,
    })
}

/// A patient, doctor or clinic identifier.
///
/// Values obtained through [`EntityId::parse`] (or `FromStr`) are known to match the entity ID
/// format. Values returned by generation always carry the right prefix, date and suffix, but a
/// sequence wider than six digits is written out in full and such an ID will not validate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityId {
    value: String,
    entity_type: EntityType,
}

impl EntityId {
    pub(crate) fn from_generated(value: String, entity_type: EntityType) -> Self {
        Self { value, entity_type }
    }

    /// Validates `input` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidFormat`] if `input` is not a well-formed entity ID.
    pub fn parse(input: &str) -> IdResult<Self> {
        let raw = split_fields(input).ok_or_else(|| IdError::InvalidFormat(input.to_string()))?;
        Ok(Self {
            value: input.to_string(),
            entity_type: raw.entity_type,
        })
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the parsed fields, or `None` for a generated ID whose sequence overflowed the
    /// accepted width.
    pub fn parts(&self) -> Option<EntityIdParts> {
        parse(&self.value)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EntityId::parse(&s).map_err(serde::de::Error::custom)
    }
}
