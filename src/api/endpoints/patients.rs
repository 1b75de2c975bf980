//! Patient endpoints: account CRUD plus the vitals read/update/history
//! surface.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::auth::hash_password;
use crate::auth::session::Role;
use crate::db::repository;
use crate::health::{self, classifier, VitalsSubmission};
use crate::models::{HistoryEntry, Patient, PatientUpdate, Vitals};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterPatientResponse {
    pub token: String,
    pub patient: Patient,
}

/// `POST /api/patients` — register a patient account. Public.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<RegisterPatientResponse>), ApiError> {
    let conn = ctx.state.open_db()?;

    if repository::find_patient_by_email(&conn, &req.email)?.is_some() {
        return Err(ApiError::BadRequest(
            "Patient already exists with this email".into(),
        ));
    }

    let now = Utc::now().naive_utc();
    let patient = Patient {
        id: Uuid::new_v4(),
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone: req.phone,
        date_of_birth: req.date_of_birth,
        health_data: Vitals::baseline(),
        created_at: now,
        updated_at: now,
    };
    let password_hash = hash_password(&req.password);
    repository::insert_patient(&conn, &patient, &password_hash)?;

    let token = ctx.state.issue_session(patient.id, Role::Patient)?;
    tracing::info!(patient_id = %patient.id, "patient registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterPatientResponse { token, patient }),
    ))
}

/// A patient plus the triage labels derived from their current vitals.
/// The labels are computed per response and never stored.
#[derive(Serialize)]
pub struct TriagedPatient {
    #[serde(flatten)]
    pub patient: Patient,
    pub condition: classifier::Condition,
    pub status: classifier::Status,
}

/// `GET /api/patients` — all patients with triage labels, for the
/// provider-side roster.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
) -> Result<Json<Vec<TriagedPatient>>, ApiError> {
    let conn = ctx.state.open_db()?;
    let patients = repository::list_patients(&conn)?;

    let triaged = patients
        .into_iter()
        .map(|patient| {
            let reading = patient.health_data.reading();
            TriagedPatient {
                condition: classifier::condition(Some(&reading)),
                status: classifier::status(Some(&reading)),
                patient,
            }
        })
        .collect();

    Ok(Json(triaged))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.state.open_db()?;
    let patient = repository::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(Json(patient))
}

/// `PUT /api/patients/:id` — partial demographic update. Vitals sub-fields
/// provided here overwrite the current slot directly, with no history
/// append; the validated path is `/health`.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatientUpdate>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.state.open_db()?;
    let patient = repository::update_patient_profile(&conn, &id, &body)?;
    Ok(Json(patient))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDataResponse {
    pub health_data: Vitals,
}

/// `GET /api/patients/:id/health` — current vitals only.
pub async fn health_data(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<HealthDataResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let vitals = repository::get_vitals(&conn, &id)?;
    Ok(Json(HealthDataResponse {
        health_data: vitals,
    }))
}

/// `PUT /api/patients/:id/health` — the validated vitals update.
///
/// A submission that fails validation is rejected whole with the per-field
/// error map; nothing is written. On success the previous snapshot is
/// archived and the current slot overwritten atomically, and the response
/// carries the new current vitals.
pub async fn update_health_data(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(submission): Json<VitalsSubmission>,
) -> Result<Json<HealthDataResponse>, ApiError> {
    let validated = health::validate(&submission).map_err(ApiError::Validation)?;

    let mut conn = ctx.state.open_db()?;
    let vitals = repository::update_vitals(&mut conn, &id, &validated)?;

    tracing::debug!(patient_id = %id, "vitals updated");

    Ok(Json(HealthDataResponse {
        health_data: vitals,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthHistoryResponse {
    pub health_history: Vec<HistoryEntry>,
}

/// `GET /api/patients/:id/health/history` — archived snapshots, oldest
/// first.
pub async fn health_history(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<HealthHistoryResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let history = repository::get_health_history(&conn, &id)?;
    Ok(Json(HealthHistoryResponse {
        health_history: history,
    }))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `DELETE /api/patients/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    repository::delete_patient(&conn, &id)?;
    ctx.state.revoke_sessions(&id)?;

    tracing::info!(patient_id = %id, "patient deleted");

    Ok(Json(MessageResponse {
        message: "Patient deleted successfully".into(),
    }))
}
