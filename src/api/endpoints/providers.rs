//! Provider endpoints: account CRUD. Providers carry no vitals.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::auth::hash_password;
use crate::auth::session::Role;
use crate::db::repository;
use crate::models::{Provider, ProviderUpdate};

use super::patients::MessageResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProviderRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub specialty: String,
    pub years_of_experience: i64,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterProviderResponse {
    pub token: String,
    pub provider: Provider,
}

/// `POST /api/providers` — register a provider account. Public.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterProviderRequest>,
) -> Result<(StatusCode, Json<RegisterProviderResponse>), ApiError> {
    let conn = ctx.state.open_db()?;

    if repository::find_provider_by_email(&conn, &req.email)?.is_some() {
        return Err(ApiError::BadRequest(
            "Provider already exists with this email".into(),
        ));
    }

    let provider = Provider {
        id: Uuid::new_v4(),
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone: req.phone,
        license_number: req.license_number,
        specialty: req.specialty,
        years_of_experience: req.years_of_experience,
        created_at: Utc::now().naive_utc(),
    };
    let password_hash = hash_password(&req.password);
    repository::insert_provider(&conn, &provider, &password_hash)?;

    let token = ctx.state.issue_session(provider.id, Role::Provider)?;
    tracing::info!(provider_id = %provider.id, "provider registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterProviderResponse { token, provider }),
    ))
}

/// `GET /api/providers`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
) -> Result<Json<Vec<Provider>>, ApiError> {
    let conn = ctx.state.open_db()?;
    Ok(Json(repository::list_providers(&conn)?))
}

/// `GET /api/providers/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Provider>, ApiError> {
    let conn = ctx.state.open_db()?;
    let provider = repository::get_provider(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Provider not found".into()))?;
    Ok(Json(provider))
}

/// `PUT /api/providers/:id` — partial update, credentials excluded.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProviderUpdate>,
) -> Result<Json<Provider>, ApiError> {
    let conn = ctx.state.open_db()?;
    let provider = repository::update_provider(&conn, &id, &body)?;
    Ok(Json(provider))
}

/// `DELETE /api/providers/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    repository::delete_provider(&conn, &id)?;
    ctx.state.revoke_sessions(&id)?;

    tracing::info!(provider_id = %id, "provider deleted");

    Ok(Json(MessageResponse {
        message: "Provider deleted successfully".into(),
    }))
}
