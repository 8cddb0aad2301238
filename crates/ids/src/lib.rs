//! Structured identifier utilities.
//!
//! MedID hands out human-readable identifiers for the records a healthcare marketplace keeps:
//! patients, doctors and clinics (*entity IDs*), and appointments, prescriptions, invoices and lab
//! orders (*transactional IDs*). It also issues health-account numbers in the grouped 14-digit form
//! used by national digital health ID schemes.
//!
//! ## Entity IDs
//! `PREFIX-YYYYMMDD-SEQUENCE-RANDOM`
//!
//! - `PREFIX`: `PAT`, `DOC` or `CLN`
//! - `YYYYMMDD`: local calendar date at generation time
//! - `SEQUENCE`: zero-padded ordinal (6 digits for patients, 5 for doctors and clinics)
//! - `RANDOM`: 4 digits in `1000..=9999`, carries no meaning
//!
//! Example: `PAT-20250113-000123-4567`
//!
//! Entity IDs can be validated and parsed back into their parts. The validator accepts a 5 or 6
//! digit sequence for every prefix, which is looser than what generation produces.
//!
//! ## Transactional IDs
//! `TYPECODE-YYYYMMDD[-EXTRA]-RANDOM`, for example `APT-20250113-1430-7890` or
//! `LAB-20250113-BLOOD-1234`. These are generate-only.
//!
//! ## Health-account IDs
//! `NN-NNNN-NNNN-NNNN`, fully random, no embedded semantics.
//!
//! ## Collaborators
//! [`IdentifierService`] reads the time from a [`Clock`], draws suffixes from a [`RandomSource`]
//! and allocates sequences from a [`SequenceSource`]. All three are injected so callers can swap
//! in durable sequence stores and tests can pin the clock and RNG.

mod clock;
pub mod config;
pub mod constants;
mod entity;
mod random;
mod sequence;
mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{IdConfig, SequenceSourceKind};
pub use entity::{EntityId, EntityIdParts, EntityIdValidation, EntityType};
pub use random::{FixedRandom, RandomSource, ThreadRandom};
pub use sequence::{CounterSequenceSource, RandomSequenceSource, SequenceSource};
pub use service::IdentifierService;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The string is not a well-formed identifier.
    #[error("Invalid ID format: '{0}'")]
    InvalidFormat(String),
    /// Invalid input provided (unknown entity type, bad configuration value).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The sequence source could not allocate a sequence.
    #[error("sequence unavailable: {0}")]
    SequenceUnavailable(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
