//! Login endpoints.
//!
//! - `POST /api/auth/patient/login`
//! - `POST /api/auth/provider/login`
//!
//! Unknown email and wrong password produce the same response, so login
//! attempts cannot probe which addresses exist.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::session::Role;
use crate::auth::verify_password;
use crate::db::repository;
use crate::models::{Patient, Provider};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientLoginResponse {
    pub token: String,
    pub patient: Patient,
    /// True when the stored vitals still equal the registration baseline,
    /// i.e. the patient has never entered real data and the client should
    /// prompt for a first measurement.
    pub needs_health_data: bool,
}

/// `POST /api/auth/patient/login`
pub async fn patient_login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<PatientLoginResponse>, ApiError> {
    let conn = ctx.state.open_db()?;

    let (id, hash) = repository::patient_credentials(&conn, &req.email)?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&req.password, &hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let patient =
        repository::get_patient(&conn, &id)?.ok_or(ApiError::InvalidCredentials)?;
    let token = ctx.state.issue_session(id, Role::Patient)?;

    tracing::debug!(patient_id = %id, "patient login");

    Ok(Json(PatientLoginResponse {
        token,
        needs_health_data: patient.health_data.is_baseline(),
        patient,
    }))
}

#[derive(Serialize)]
pub struct ProviderLoginResponse {
    pub token: String,
    pub provider: Provider,
}

/// `POST /api/auth/provider/login`
pub async fn provider_login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ProviderLoginResponse>, ApiError> {
    let conn = ctx.state.open_db()?;

    let (id, hash) = repository::provider_credentials(&conn, &req.email)?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&req.password, &hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let provider =
        repository::get_provider(&conn, &id)?.ok_or(ApiError::InvalidCredentials)?;
    let token = ctx.state.issue_session(id, Role::Provider)?;

    tracing::debug!(provider_id = %id, "provider login");

    Ok(Json(ProviderLoginResponse { token, provider }))
}
