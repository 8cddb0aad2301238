//! Sequence allocation for entity IDs.
//!
//! The identifier service does not own sequences; it asks a [`SequenceSource`] for the next one.
//! A production deployment backs this with durable storage (an auto-increment column, a
//! transactional counter). The implementations here cover development and single-process use.

use crate::constants::PLACEHOLDER_SEQUENCE_RANGE;
use crate::{EntityType, IdError, IdResult};
use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Allocates the sequence number embedded in a new entity ID.
///
/// Implementations may suspend (network or storage round trip) and may fail; callers must
/// propagate [`IdError::SequenceUnavailable`] rather than invent a sequence.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    async fn next_sequence(&self, entity_type: EntityType) -> IdResult<u64>;
}

/// Draws a random sequence in `1..=1000`.
///
/// Stand-in for a real allocator. Sequences repeat, so only the random suffix separates IDs
/// created concurrently.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomSequenceSource;

#[async_trait]
impl SequenceSource for RandomSequenceSource {
    async fn next_sequence(&self, _entity_type: EntityType) -> IdResult<u64> {
        Ok(rand::thread_rng().gen_range(PLACEHOLDER_SEQUENCE_RANGE))
    }
}

/// In-memory counter per entity type.
///
/// Monotonic and unique within one process; state is lost on restart.
#[derive(Debug)]
pub struct CounterSequenceSource {
    patient: AtomicU64,
    doctor: AtomicU64,
    clinic: AtomicU64,
}

impl CounterSequenceSource {
    /// Every entity type starts counting at `start`.
    pub fn new(start: u64) -> Self {
        Self {
            patient: AtomicU64::new(start),
            doctor: AtomicU64::new(start),
            clinic: AtomicU64::new(start),
        }
    }

    fn counter(&self, entity_type: EntityType) -> &AtomicU64 {
        match entity_type {
            EntityType::Patient => &self.patient,
            EntityType::Doctor => &self.doctor,
            EntityType::Clinic => &self.clinic,
        }
    }
}

impl Default for CounterSequenceSource {
    fn default() -> Self {
        Self::new(1)
    }
}

#[async_trait]
impl SequenceSource for CounterSequenceSource {
    async fn next_sequence(&self, entity_type: EntityType) -> IdResult<u64> {
        self.counter(entity_type)
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map_err(|_| {
                IdError::SequenceUnavailable(format!("{} sequence exhausted", entity_type))
            })
    }
}
