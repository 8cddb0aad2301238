//! Identifier service configuration.
//!
//! Configuration is resolved once at process startup and then used to build the
//! [`IdentifierService`]. Parsing helpers take the raw environment value as an `Option<String>` so
//! that nothing here reads process-wide environment variables.

use crate::{
    CounterSequenceSource, IdError, IdResult, IdentifierService, RandomSequenceSource,
    SequenceSource,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which sequence allocator backs `create_entity_id`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SequenceSourceKind {
    /// Placeholder draws in `1..=1000`.
    #[default]
    Random,
    /// In-memory monotonic counter per entity type.
    Counter,
}

impl fmt::Display for SequenceSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceSourceKind::Random => f.write_str("random"),
            SequenceSourceKind::Counter => f.write_str("counter"),
        }
    }
}

impl FromStr for SequenceSourceKind {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(SequenceSourceKind::Random),
            "counter" => Ok(SequenceSourceKind::Counter),
            _ => Err(IdError::InvalidInput(format!(
                "unknown sequence source '{}', expected 'random' or 'counter'",
                s
            ))),
        }
    }
}

/// Identifier configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdConfig {
    sequence_source: SequenceSourceKind,
    sequence_start: u64,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            sequence_source: SequenceSourceKind::Random,
            sequence_start: 1,
        }
    }
}

impl IdConfig {
    pub fn new(sequence_source: SequenceSourceKind, sequence_start: u64) -> Self {
        Self {
            sequence_source,
            sequence_start,
        }
    }

    /// Builds a config from raw `MEDID_SEQUENCE_SOURCE` and `MEDID_SEQUENCE_START` values.
    pub fn from_env_values(
        sequence_source: Option<String>,
        sequence_start: Option<String>,
    ) -> IdResult<Self> {
        Ok(Self::new(
            sequence_source_from_env_value(sequence_source)?,
            sequence_start_from_env_value(sequence_start)?,
        ))
    }

    pub fn sequence_source(&self) -> SequenceSourceKind {
        self.sequence_source
    }

    pub fn sequence_start(&self) -> u64 {
        self.sequence_start
    }

    pub fn build_sequence_source(&self) -> Arc<dyn SequenceSource> {
        match self.sequence_source {
            SequenceSourceKind::Random => Arc::new(RandomSequenceSource),
            SequenceSourceKind::Counter => Arc::new(CounterSequenceSource::new(self.sequence_start)),
        }
    }

    /// Builds a service with the system clock and RNG and the configured sequence source.
    pub fn build_service(&self) -> IdentifierService {
        IdentifierService::new().with_sequence_source(self.build_sequence_source())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses the sequence source from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`SequenceSourceKind::Random`].
pub fn sequence_source_from_env_value(value: Option<String>) -> IdResult<SequenceSourceKind> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<SequenceSourceKind>())
        .transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Parses the counter start from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `1`.
pub fn sequence_start_from_env_value(value: Option<String>) -> IdResult<u64> {
    let parsed = non_blank(value)
        .map(|v| {
            v.parse::<u64>().map_err(|e| {
                IdError::InvalidInput(format!("invalid sequence start '{}': {}", v, e))
            })
        })
        .transpose()?;

    Ok(parsed.unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityType;

    #[test]
    fn test_defaults_when_unset() {
        let cfg = IdConfig::from_env_values(None, None).unwrap();

        assert_eq!(cfg, IdConfig::default());
        assert_eq!(cfg.sequence_source(), SequenceSourceKind::Random);
        assert_eq!(cfg.sequence_start(), 1);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let cfg = IdConfig::from_env_values(Some("  ".into()), Some("".into())).unwrap();

        assert_eq!(cfg, IdConfig::default());
    }

    #[test]
    fn test_parses_counter_source() {
        let cfg = IdConfig::from_env_values(Some(" Counter ".into()), Some("500".into())).unwrap();

        assert_eq!(cfg.sequence_source(), SequenceSourceKind::Counter);
        assert_eq!(cfg.sequence_start(), 500);
    }

    #[test]
    fn test_rejects_unknown_source() {
        match sequence_source_from_env_value(Some("postgres".into())) {
            Err(IdError::InvalidInput(msg)) => assert!(msg.contains("postgres")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_numeric_start() {
        assert!(sequence_start_from_env_value(Some("-3".into())).is_err());
        assert!(sequence_start_from_env_value(Some("ten".into())).is_err());
    }

    #[tokio::test]
    async fn test_build_service_uses_counter_start() {
        let cfg = IdConfig::new(SequenceSourceKind::Counter, 77);
        let service = cfg.build_service();

        let id = service.create_entity_id(EntityType::Patient).await.unwrap();
        assert_eq!(id.parts().unwrap().sequence, 77);
    }
}
