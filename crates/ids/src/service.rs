//! Identifier generation, validation and parsing.

use crate::constants::{
    APPOINTMENT_PREFIX, DATE_FORMAT, DEFAULT_LAB_TEST_TYPE, HEALTH_ACCOUNT_GROUP_RANGE,
    HEALTH_ACCOUNT_LEAD_RANGE, ID_SEPARATOR, INVOICE_PREFIX, LAB_TEST_PREFIX, PRESCRIPTION_PREFIX,
    RANDOM_SUFFIX_RANGE, TIME_OF_DAY_FORMAT,
};
use crate::entity;
use crate::{
    Clock, EntityId, EntityIdParts, EntityIdValidation, EntityType, IdResult, RandomSequenceSource,
    RandomSource, SequenceSource, SystemClock, ThreadRandom,
};
use std::fmt;
use std::sync::Arc;

/// Generates and checks MedID identifiers.
///
/// The service holds no state of its own beyond its collaborators, so it is cheap to clone and
/// safe to share between request handlers.
///
/// # Construction
/// - [`IdentifierService::new`] uses the system clock, the thread-local RNG and the placeholder
///   random sequence source.
/// - `with_*` methods replace individual collaborators.
///
/// # Example
/// ```
/// use medid_ids::{EntityType, FixedClock, FixedRandom, IdentifierService};
///
/// let service = IdentifierService::new()
///     .with_clock(FixedClock::at(2025, 1, 13, 14, 30).unwrap())
///     .with_random(FixedRandom(7890));
///
/// let id = service.generate_entity_id(EntityType::Patient, 123);
/// assert_eq!(id.as_str(), "PAT-20250113-000123-7890");
/// assert_eq!(service.generate_appointment_id(), "APT-20250113-1430-7890");
/// ```
#[derive(Clone)]
pub struct IdentifierService {
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    sequences: Arc<dyn SequenceSource>,
}

impl Default for IdentifierService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentifierService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierService").finish_non_exhaustive()
    }
}

impl IdentifierService {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            random: Arc::new(ThreadRandom),
            sequences: Arc::new(RandomSequenceSource),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(random);
        self
    }

    /// Replaces the sequence source. Takes an `Arc` so the caller can keep a handle on a shared
    /// allocator.
    pub fn with_sequence_source(mut self, sequences: Arc<dyn SequenceSource>) -> Self {
        self.sequences = sequences;
        self
    }

    fn random_suffix(&self) -> u32 {
        self.random.draw(RANDOM_SUFFIX_RANGE)
    }

    fn today(&self) -> String {
        self.clock.now().format(DATE_FORMAT).to_string()
    }

    /// Builds `PREFIX-YYYYMMDD-SEQUENCE-RANDOM` for `entity_type` using today's local date.
    ///
    /// `sequence` is zero-padded to the type's width (6 for patients, 5 otherwise). A wider
    /// sequence is written out in full; the result is still returned but will not pass
    /// [`IdentifierService::validate_entity_id`].
    pub fn generate_entity_id(&self, entity_type: EntityType, sequence: u64) -> EntityId {
        let id = format!(
            "{prefix}{sep}{date}{sep}{sequence:0width$}{sep}{random}",
            prefix = entity_type.prefix(),
            sep = ID_SEPARATOR,
            date = self.today(),
            sequence = sequence,
            width = entity_type.sequence_width(),
            random = self.random_suffix(),
        );
        tracing::debug!(%entity_type, sequence, id = %id, "generated entity id");
        EntityId::from_generated(id, entity_type)
    }

    /// Checks `input` against the entity ID format.
    ///
    /// The sequence field may be 5 or 6 digits whatever the prefix; generation is stricter than
    /// this check. The date field is not checked against the calendar.
    pub fn validate_entity_id(input: &str) -> EntityIdValidation {
        entity::validate(input)
    }

    /// Splits a valid entity ID into its fields, or returns `None` if `input` does not validate.
    pub fn parse_entity_id(input: &str) -> Option<EntityIdParts> {
        entity::parse(input)
    }

    /// Returns a health-account number `NN-NNNN-NNNN-NNNN`.
    ///
    /// Every group is an independent draw. There is no check digit and no validator.
    pub fn generate_health_account_id(&self) -> String {
        let lead = self.random.draw(HEALTH_ACCOUNT_LEAD_RANGE);
        let groups: [u32; 3] =
            std::array::from_fn(|_| self.random.draw(HEALTH_ACCOUNT_GROUP_RANGE));
        format!(
            "{lead}{sep}{}{sep}{}{sep}{}",
            groups[0],
            groups[1],
            groups[2],
            sep = ID_SEPARATOR
        )
    }

    /// `APT-YYYYMMDD-HHMM-RANDOM`
    pub fn generate_appointment_id(&self) -> String {
        let now = self.clock.now();
        self.transactional_id(
            APPOINTMENT_PREFIX,
            Some(&now.format(TIME_OF_DAY_FORMAT).to_string()),
        )
    }

    /// `RX-YYYYMMDD-<doctor_token>-RANDOM`. The token is embedded verbatim.
    pub fn generate_prescription_id(&self, doctor_token: &str) -> String {
        self.transactional_id(PRESCRIPTION_PREFIX, Some(doctor_token))
    }

    /// `INV-YYYYMMDD-RANDOM`
    pub fn generate_invoice_id(&self) -> String {
        self.transactional_id(INVOICE_PREFIX, None)
    }

    /// `LAB-YYYYMMDD-<TEST_TYPE>-RANDOM`. The test type is upper-cased; `None` means `GEN`.
    pub fn generate_lab_test_id(&self, test_type: Option<&str>) -> String {
        let test_type = test_type.unwrap_or(DEFAULT_LAB_TEST_TYPE).to_uppercase();
        self.transactional_id(LAB_TEST_PREFIX, Some(&test_type))
    }

    fn transactional_id(&self, prefix: &str, extra: Option<&str>) -> String {
        let date = self.today();
        let random = self.random_suffix();
        let sep = ID_SEPARATOR;
        let id = match extra {
            Some(extra) => format!("{prefix}{sep}{date}{sep}{extra}{sep}{random}"),
            None => format!("{prefix}{sep}{date}{sep}{random}"),
        };
        tracing::debug!(prefix, id = %id, "generated transactional id");
        id
    }

    /// Asks the configured sequence source for the next sequence of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IdError::SequenceUnavailable`] if the source cannot allocate.
    pub async fn next_sequence(&self, entity_type: EntityType) -> IdResult<u64> {
        self.sequences
            .next_sequence(entity_type)
            .await
            .inspect_err(|e| tracing::warn!(%entity_type, "sequence allocation failed: {}", e))
    }

    /// Allocates a sequence and generates an entity ID from it.
    ///
    /// # Errors
    ///
    /// Propagates sequence source failures.
    pub async fn create_entity_id(&self, entity_type: EntityType) -> IdResult<EntityId> {
        let sequence = self.next_sequence(entity_type).await?;
        Ok(self.generate_entity_id(entity_type, sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CounterSequenceSource, FixedClock, FixedRandom, IdError};
    use async_trait::async_trait;
    use chrono::{Local, NaiveDate};

    fn fixed_service() -> IdentifierService {
        IdentifierService::new()
            .with_clock(FixedClock::at(2025, 1, 13, 14, 30).unwrap())
            .with_random(FixedRandom(7890))
    }

    fn all_digits(s: &str, len: usize) -> bool {
        s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
    }

    struct UnavailableSequenceSource;

    #[async_trait]
    impl SequenceSource for UnavailableSequenceSource {
        async fn next_sequence(&self, _entity_type: EntityType) -> IdResult<u64> {
            Err(IdError::SequenceUnavailable("store offline".into()))
        }
    }

    #[test]
    fn test_generate_entity_id_pads_per_type() {
        let service = fixed_service();

        assert_eq!(
            service.generate_entity_id(EntityType::Patient, 123).as_str(),
            "PAT-20250113-000123-7890"
        );
        assert_eq!(
            service.generate_entity_id(EntityType::Doctor, 45).as_str(),
            "DOC-20250113-00045-7890"
        );
        assert_eq!(
            service.generate_entity_id(EntityType::Clinic, 0).as_str(),
            "CLN-20250113-00000-7890"
        );
    }

    #[test]
    fn test_generate_entity_id_format_with_system_collaborators() {
        let service = IdentifierService::new();

        let patient = service.generate_entity_id(EntityType::Patient, 123).into_inner();
        let fields: Vec<&str> = patient.split('-').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "PAT");
        assert!(all_digits(fields[1], 8));
        assert_eq!(fields[2], "000123");
        assert!(all_digits(fields[3], 4));

        let doctor = service.generate_entity_id(EntityType::Doctor, 45).into_inner();
        let fields: Vec<&str> = doctor.split('-').collect();
        assert_eq!(fields[0], "DOC");
        assert_eq!(fields[2], "00045");
        assert!(all_digits(fields[3], 4));
    }

    #[test]
    fn test_generate_entity_id_round_trips_through_parse() {
        let service = IdentifierService::new();
        let sequences = [0u64, 1, 45, 9_999, 99_999];

        for entity_type in EntityType::ALL {
            for sequence in sequences {
                let today = Local::now().date_naive();
                let id = service.generate_entity_id(entity_type, sequence);
                let parts = IdentifierService::parse_entity_id(id.as_str()).unwrap();

                assert_eq!(parts.entity_type, entity_type);
                assert_eq!(parts.sequence, sequence);
                // Tolerate a run that straddles midnight.
                let date = parts.date.unwrap();
                assert!(date == today || date == Local::now().date_naive());
            }
        }
    }

    #[test]
    fn test_round_trip_with_fixed_clock_recovers_exact_date() {
        let service = fixed_service();
        let id = service.generate_entity_id(EntityType::Patient, 999_999);
        let parts = id.parts().unwrap();

        assert_eq!(parts.date, NaiveDate::from_ymd_opt(2025, 1, 13));
        assert_eq!(parts.sequence, 999_999);
        assert_eq!(parts.random, 7890);
    }

    #[test]
    fn test_generate_entity_id_overlong_sequence_grows_field() {
        let service = fixed_service();
        let id = service.generate_entity_id(EntityType::Doctor, 1_234_567);

        assert_eq!(id.as_str(), "DOC-20250113-1234567-7890");
        assert_eq!(id.entity_type(), EntityType::Doctor);
        assert!(!IdentifierService::validate_entity_id(id.as_str()).is_valid);
        assert_eq!(id.parts(), None);
    }

    #[test]
    fn test_same_sequence_differs_only_in_random_suffix() {
        let service = IdentifierService::new().with_clock(FixedClock::at(2025, 1, 13, 9, 0).unwrap());
        let a = service.generate_entity_id(EntityType::Clinic, 7).into_inner();
        let b = service.generate_entity_id(EntityType::Clinic, 7).into_inner();

        assert_eq!(a[..a.len() - 4], b[..b.len() - 4]);
    }

    #[test]
    fn test_validate_entity_id_cases() {
        let quirk = IdentifierService::validate_entity_id("PAT-20250113-00123-4567");
        assert!(quirk.is_valid);
        assert_eq!(quirk.entity_type, Some(EntityType::Patient));

        for invalid in ["XYZ-20250113-000123-4567", "not-an-id"] {
            let result = IdentifierService::validate_entity_id(invalid);
            assert!(!result.is_valid);
            assert_eq!(result.entity_type, None);
            assert_eq!(result.error.as_deref(), Some("Invalid ID format"));
        }
    }

    #[test]
    fn test_parse_entity_id_garbage_is_none() {
        assert_eq!(IdentifierService::parse_entity_id("garbage"), None);
    }

    #[test]
    fn test_health_account_id_format() {
        let service = IdentifierService::new();
        for _ in 0..200 {
            let id = service.generate_health_account_id();
            let groups: Vec<&str> = id.split('-').collect();

            assert_eq!(groups.len(), 4);
            assert!(all_digits(groups[0], 2));
            assert!(all_digits(groups[1], 4));
            assert!(all_digits(groups[2], 4));
            assert!(all_digits(groups[3], 4));
        }
    }

    #[test]
    fn test_health_account_id_with_fixed_random() {
        assert_eq!(fixed_service().generate_health_account_id(), "99-7890-7890-7890");
    }

    #[test]
    fn test_appointment_id_literal() {
        assert_eq!(fixed_service().generate_appointment_id(), "APT-20250113-1430-7890");
    }

    #[test]
    fn test_appointment_id_pads_early_times() {
        let service = IdentifierService::new()
            .with_clock(FixedClock::at(2025, 3, 2, 7, 5).unwrap())
            .with_random(FixedRandom(1000));

        assert_eq!(service.generate_appointment_id(), "APT-20250302-0705-1000");
    }

    #[test]
    fn test_prescription_id_embeds_token_verbatim() {
        let service = fixed_service();

        assert_eq!(service.generate_prescription_id("00045"), "RX-20250113-00045-7890");
        assert_eq!(service.generate_prescription_id("dr x"), "RX-20250113-dr x-7890");
    }

    #[test]
    fn test_invoice_id_has_no_extra_field() {
        assert_eq!(fixed_service().generate_invoice_id(), "INV-20250113-7890");
    }

    #[test]
    fn test_lab_test_id_uppercases_type() {
        let service = fixed_service();

        assert_eq!(service.generate_lab_test_id(Some("blood")), "LAB-20250113-BLOOD-7890");
        assert_eq!(service.generate_lab_test_id(None), "LAB-20250113-GEN-7890");
    }

    #[test]
    fn test_lab_test_id_format_with_system_collaborators() {
        let id = IdentifierService::new().generate_lab_test_id(Some("blood"));
        let fields: Vec<&str> = id.split('-').collect();

        assert_eq!(fields[0], "LAB");
        assert!(all_digits(fields[1], 8));
        assert_eq!(fields[2], "BLOOD");
        assert!(all_digits(fields[3], 4));
    }

    #[tokio::test]
    async fn test_create_entity_id_uses_sequence_source() {
        let service = fixed_service().with_sequence_source(Arc::new(CounterSequenceSource::new(41)));

        let first = service.create_entity_id(EntityType::Doctor).await.unwrap();
        let second = service.create_entity_id(EntityType::Doctor).await.unwrap();

        assert_eq!(first.as_str(), "DOC-20250113-00041-7890");
        assert_eq!(second.as_str(), "DOC-20250113-00042-7890");
    }

    #[tokio::test]
    async fn test_create_entity_id_with_placeholder_source() {
        let id = IdentifierService::new()
            .create_entity_id(EntityType::Patient)
            .await
            .unwrap();
        let parts = id.parts().unwrap();

        assert_eq!(parts.entity_type, EntityType::Patient);
        assert!((1..=1000).contains(&parts.sequence));
    }

    #[tokio::test]
    async fn test_create_entity_id_propagates_sequence_failure() {
        let service = fixed_service().with_sequence_source(Arc::new(UnavailableSequenceSource));

        match service.create_entity_id(EntityType::Clinic).await {
            Err(IdError::SequenceUnavailable(msg)) => assert_eq!(msg, "store offline"),
            other => panic!("Expected SequenceUnavailable, got {:?}", other),
        }
    }
}
