//! # API REST
//!
//! REST API for MedID.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Identifier logic lives in `medid-ids`; handlers here only translate between JSON and the
//! [`IdentifierService`] API.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use medid_ids::{EntityType, IdError, IdentifierService};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    ids: IdentifierService,
}

impl AppState {
    pub fn new(ids: IdentifierService) -> Self {
        Self { ids }
    }
}

type ApiResult<T> = Result<T, (StatusCode, &'static str)>;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdRes {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEntityIdReq {
    /// `patient`, `doctor` or `clinic`.
    pub entity_type: String,
    /// Sequence to embed. When absent one is allocated from the configured sequence source.
    #[serde(default)]
    pub sequence: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateEntityIdRes {
    pub is_valid: bool,
    pub entity_type: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParseEntityIdRes {
    pub entity_type: String,
    /// `YYYY-MM-DD`, or null when the date field names no real calendar day.
    pub date: Option<String>,
    pub sequence: u64,
    pub random: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePrescriptionIdReq {
    pub doctor_token: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateLabTestIdReq {
    /// Defaults to `GEN`. Upper-cased before use.
    #[serde(default)]
    pub test_type: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        create_entity_id,
        validate_entity_id,
        parse_entity_id,
        create_health_account_id,
        create_appointment_id,
        create_prescription_id,
        create_invoice_id,
        create_lab_test_id,
    ),
    components(schemas(
        HealthRes,
        IdRes,
        CreateEntityIdReq,
        ValidateEntityIdRes,
        ParseEntityIdRes,
        CreatePrescriptionIdReq,
        CreateLabTestIdReq,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ids/entity", post(create_entity_id))
        .route("/ids/entity/:id", get(parse_entity_id))
        .route("/ids/entity/:id/validate", get(validate_entity_id))
        .route("/ids/health-account", post(create_health_account_id))
        .route("/ids/appointment", post(create_appointment_id))
        .route("/ids/prescription", post(create_prescription_id))
        .route("/ids/invoice", post(create_invoice_id))
        .route("/ids/lab-test", post(create_lab_test_id))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn created(id: String) -> (StatusCode, Json<IdRes>) {
    (StatusCode::CREATED, Json(IdRes { id }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "MedID REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/ids/entity",
    request_body = CreateEntityIdReq,
    responses(
        (status = 201, description = "Entity ID generated", body = IdRes),
        (status = 400, description = "Unknown entity type"),
        (status = 503, description = "Sequence source unavailable")
    )
)]
/// Generate a patient, doctor or clinic ID
///
/// Uses the supplied sequence, or allocates one from the sequence source when none is given.
async fn create_entity_id(
    State(state): State<AppState>,
    Json(req): Json<CreateEntityIdReq>,
) -> ApiResult<(StatusCode, Json<IdRes>)> {
    let entity_type: EntityType = req.entity_type.parse().map_err(|e| {
        tracing::warn!("Create entity id rejected: {}", e);
        (StatusCode::BAD_REQUEST, "Unknown entity type")
    })?;

    let id = match req.sequence {
        Some(sequence) => state.ids.generate_entity_id(entity_type, sequence),
        None => state
            .ids
            .create_entity_id(entity_type)
            .await
            .map_err(|e| match &e {
                IdError::SequenceUnavailable(_) => {
                    tracing::error!("Create entity id error: {:?}", e);
                    (StatusCode::SERVICE_UNAVAILABLE, "Sequence source unavailable")
                }
                _ => {
                    tracing::error!("Create entity id error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
                }
            })?,
    };

    Ok(created(id.into_inner()))
}

#[utoipa::path(
    get,
    path = "/ids/entity/{id}/validate",
    params(("id" = String, Path, description = "Candidate entity ID")),
    responses(
        (status = 200, description = "Validation outcome", body = ValidateEntityIdRes)
    )
)]
/// Validate an entity ID
///
/// Always answers 200; an invalid ID is reported in the body.
async fn validate_entity_id(AxumPath(id): AxumPath<String>) -> Json<ValidateEntityIdRes> {
    let outcome = IdentifierService::validate_entity_id(&id);
    Json(ValidateEntityIdRes {
        is_valid: outcome.is_valid,
        entity_type: outcome.entity_type.map(|t| t.to_string()),
        error: outcome.error,
    })
}

#[utoipa::path(
    get,
    path = "/ids/entity/{id}",
    params(("id" = String, Path, description = "Entity ID to parse")),
    responses(
        (status = 200, description = "Parsed entity ID", body = ParseEntityIdRes),
        (status = 404, description = "Not a valid entity ID")
    )
)]
/// Parse an entity ID into its fields
async fn parse_entity_id(AxumPath(id): AxumPath<String>) -> ApiResult<Json<ParseEntityIdRes>> {
    let parts = IdentifierService::parse_entity_id(&id)
        .ok_or((StatusCode::NOT_FOUND, "Invalid ID format"))?;

    Ok(Json(ParseEntityIdRes {
        entity_type: parts.entity_type.to_string(),
        date: parts.date.map(|d| d.to_string()),
        sequence: parts.sequence,
        random: parts.random,
    }))
}

#[utoipa::path(
    post,
    path = "/ids/health-account",
    responses(
        (status = 201, description = "Health-account ID generated", body = IdRes)
    )
)]
/// Generate a health-account ID (`NN-NNNN-NNNN-NNNN`)
async fn create_health_account_id(State(state): State<AppState>) -> (StatusCode, Json<IdRes>) {
    created(state.ids.generate_health_account_id())
}

#[utoipa::path(
    post,
    path = "/ids/appointment",
    responses(
        (status = 201, description = "Appointment ID generated", body = IdRes)
    )
)]
/// Generate an appointment ID stamped with the current date and time of day
async fn create_appointment_id(State(state): State<AppState>) -> (StatusCode, Json<IdRes>) {
    created(state.ids.generate_appointment_id())
}

#[utoipa::path(
    post,
    path = "/ids/prescription",
    request_body = CreatePrescriptionIdReq,
    responses(
        (status = 201, description = "Prescription ID generated", body = IdRes)
    )
)]
/// Generate a prescription ID embedding the prescribing doctor's token
async fn create_prescription_id(
    State(state): State<AppState>,
    Json(req): Json<CreatePrescriptionIdReq>,
) -> (StatusCode, Json<IdRes>) {
    created(state.ids.generate_prescription_id(&req.doctor_token))
}

#[utoipa::path(
    post,
    path = "/ids/invoice",
    responses(
        (status = 201, description = "Invoice ID generated", body = IdRes)
    )
)]
/// Generate an invoice ID
async fn create_invoice_id(State(state): State<AppState>) -> (StatusCode, Json<IdRes>) {
    created(state.ids.generate_invoice_id())
}

#[utoipa::path(
    post,
    path = "/ids/lab-test",
    request_body = CreateLabTestIdReq,
    responses(
        (status = 201, description = "Lab test ID generated", body = IdRes)
    )
)]
/// Generate a lab test ID for the given test type
async fn create_lab_test_id(
    State(state): State<AppState>,
    Json(req): Json<CreateLabTestIdReq>,
) -> (StatusCode, Json<IdRes>) {
    created(state.ids.generate_lab_test_id(req.test_type.as_deref()))
}
