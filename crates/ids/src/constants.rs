//! Constants used throughout the identifier crate.
//!
//! Prefixes, field formats and random ranges live here so that generation and validation agree.

use std::ops::RangeInclusive;

/// Separator between identifier fields.
pub const ID_SEPARATOR: char = '-';

/// `chrono` format for the date field of every identifier.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// `chrono` format for the time-of-day field of appointment IDs.
pub const TIME_OF_DAY_FORMAT: &str = "%H%M";

/// Width of the date field.
pub const DATE_FIELD_WIDTH: usize = 8;

/// Sequence widths the entity ID validator accepts, regardless of prefix.
pub const SEQUENCE_FIELD_WIDTHS: RangeInclusive<usize> = 5..=6;

/// Width of the random suffix.
pub const RANDOM_FIELD_WIDTH: usize = 4;

/// Range of the random suffix appended to every identifier.
pub const RANDOM_SUFFIX_RANGE: RangeInclusive<u32> = 1000..=9999;

/// Range of the leading group of a health-account ID.
pub const HEALTH_ACCOUNT_LEAD_RANGE: RangeInclusive<u32> = 10..=99;

/// Range of the three trailing groups of a health-account ID.
pub const HEALTH_ACCOUNT_GROUP_RANGE: RangeInclusive<u32> = 1000..=9999;

/// Range the placeholder sequence source draws from.
pub const PLACEHOLDER_SEQUENCE_RANGE: RangeInclusive<u64> = 1..=1000;

/// Prefix for appointment IDs.
pub const APPOINTMENT_PREFIX: &str = "APT";

/// Prefix for prescription IDs.
pub const PRESCRIPTION_PREFIX: &str = "RX";

/// Prefix for invoice IDs.
pub const INVOICE_PREFIX: &str = "INV";

/// Prefix for lab test IDs.
pub const LAB_TEST_PREFIX: &str = "LAB";

/// Test type embedded in lab test IDs when the caller supplies none.
pub const DEFAULT_LAB_TEST_TYPE: &str = "GEN";

/// Error message reported by the entity ID validator.
pub const INVALID_ID_FORMAT: &str = "Invalid ID format";
