use clap::{Parser, Subcommand};
use medid_ids::{EntityType, IdConfig, IdResult, IdentifierService, SequenceSourceKind};

#[derive(Parser)]
#[command(name = "medid")]
#[command(about = "MedID identifier generation CLI")]
struct Cli {
    /// Sequence allocator used when no explicit sequence is given
    #[arg(long, global = true, default_value_t = SequenceSourceKind::Random, value_parser = parse_sequence_source)]
    sequence_source: SequenceSourceKind,
    /// First sequence handed out by the counter allocator
    #[arg(long, global = true, default_value_t = 1)]
    sequence_start: u64,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate patient, doctor or clinic IDs
    Entity {
        /// patient, doctor or clinic
        #[arg(value_parser = parse_entity_type)]
        entity_type: EntityType,
        /// Explicit sequence to embed (skips the allocator)
        #[arg(long)]
        sequence: Option<u64>,
        /// Number of IDs to generate
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Validate an entity ID
    Validate {
        /// Candidate ID
        id: String,
    },
    /// Parse an entity ID into its fields
    Parse {
        /// Entity ID
        id: String,
    },
    /// Generate a health-account ID
    HealthAccount,
    /// Generate an appointment ID
    Appointment,
    /// Generate a prescription ID
    Prescription {
        /// Prescribing doctor's token, embedded verbatim
        doctor_token: String,
    },
    /// Generate an invoice ID
    Invoice,
    /// Generate a lab test ID
    LabTest {
        /// Test type (defaults to GEN)
        test_type: Option<String>,
    },
}

fn parse_entity_type(s: &str) -> Result<EntityType, String> {
    s.parse().map_err(|e: medid_ids::IdError| e.to_string())
}

fn parse_sequence_source(s: &str) -> Result<SequenceSourceKind, String> {
    s.parse().map_err(|e: medid_ids::IdError| e.to_string())
}

/// Runs one command and returns the lines to print.
async fn execute(command: Commands, service: &IdentifierService) -> IdResult<Vec<String>> {
    let lines = match command {
        Commands::Entity {
            entity_type,
            sequence,
            count,
        } => {
            let mut ids = Vec::with_capacity(count);
            for _ in 0..count {
                let id = match sequence {
                    Some(sequence) => service.generate_entity_id(entity_type, sequence),
                    None => service.create_entity_id(entity_type).await?,
                };
                ids.push(id.into_inner());
            }
            ids
        }
        Commands::Validate { id } => {
            let outcome = IdentifierService::validate_entity_id(&id);
            match outcome.entity_type {
                Some(entity_type) if outcome.is_valid => vec![format!("valid {}", entity_type)],
                _ => vec![format!(
                    "invalid: {}",
                    outcome.error.unwrap_or_default()
                )],
            }
        }
        Commands::Parse { id } => match IdentifierService::parse_entity_id(&id) {
            Some(parts) => vec![
                format!("entity_type: {}", parts.entity_type),
                format!(
                    "date: {}",
                    parts
                        .date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".into())
                ),
                format!("sequence: {}", parts.sequence),
                format!("random: {}", parts.random),
            ],
            None => vec!["invalid: Invalid ID format".to_string()],
        },
        Commands::HealthAccount => vec![service.generate_health_account_id()],
        Commands::Appointment => vec![service.generate_appointment_id()],
        Commands::Prescription { doctor_token } => {
            vec![service.generate_prescription_id(&doctor_token)]
        }
        Commands::Invoice => vec![service.generate_invoice_id()],
        Commands::LabTest { test_type } => {
            vec![service.generate_lab_test_id(test_type.as_deref())]
        }
    };
    Ok(lines)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = IdConfig::new(cli.sequence_source, cli.sequence_start).build_service();

    match cli.command {
        Some(command) => match execute(command, &service).await {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(e) => eprintln!("Error generating identifier: {}", e),
        },
        None => {
            println!("Use 'medid --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medid_ids::{FixedClock, FixedRandom};

    fn fixed_service(kind: SequenceSourceKind, start: u64) -> IdentifierService {
        IdConfig::new(kind, start)
            .build_service()
            .with_clock(FixedClock::at(2025, 1, 13, 14, 30).unwrap())
            .with_random(FixedRandom(7890))
    }

    #[test]
    fn test_cli_parses_entity_command() {
        let cli = Cli::try_parse_from(["medid", "entity", "Doctor", "--sequence", "45"]).unwrap();

        match cli.command {
            Some(Commands::Entity {
                entity_type,
                sequence,
                count,
            }) => {
                assert_eq!(entity_type, EntityType::Doctor);
                assert_eq!(sequence, Some(45));
                assert_eq!(count, 1);
            }
            _ => panic!("Expected entity command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_entity_type() {
        assert!(Cli::try_parse_from(["medid", "entity", "nurse"]).is_err());
        assert!(Cli::try_parse_from(["medid", "--sequence-source", "db", "invoice"]).is_err());
    }

    #[tokio::test]
    async fn test_entity_batch_uses_counter() {
        let service = fixed_service(SequenceSourceKind::Counter, 100);
        let command = Commands::Entity {
            entity_type: EntityType::Clinic,
            sequence: None,
            count: 3,
        };

        let lines = execute(command, &service).await.unwrap();
        assert_eq!(
            lines,
            vec![
                "CLN-20250113-00100-7890",
                "CLN-20250113-00101-7890",
                "CLN-20250113-00102-7890",
            ]
        );
    }

    #[tokio::test]
    async fn test_validate_and_parse_output() {
        let service = fixed_service(SequenceSourceKind::Random, 1);

        let valid = execute(
            Commands::Validate {
                id: "PAT-20250113-00123-4567".into(),
            },
            &service,
        )
        .await
        .unwrap();
        assert_eq!(valid, vec!["valid patient"]);

        let invalid = execute(
            Commands::Validate {
                id: "not-an-id".into(),
            },
            &service,
        )
        .await
        .unwrap();
        assert_eq!(invalid, vec!["invalid: Invalid ID format"]);

        let parsed = execute(
            Commands::Parse {
                id: "DOC-20250113-00045-1234".into(),
            },
            &service,
        )
        .await
        .unwrap();
        assert_eq!(
            parsed,
            vec![
                "entity_type: doctor",
                "date: 2025-01-13",
                "sequence: 45",
                "random: 1234",
            ]
        );
    }

    #[tokio::test]
    async fn test_lab_test_default_type() {
        let service = fixed_service(SequenceSourceKind::Random, 1);
        let lines = execute(Commands::LabTest { test_type: None }, &service)
            .await
            .unwrap();

        assert_eq!(lines, vec!["LAB-20250113-GEN-7890"]);
    }
}
