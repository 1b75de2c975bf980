use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A healthcare provider account: credentials plus professional metadata.
/// Providers carry no vitals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub specialty: String,
    pub years_of_experience: i64,
    pub created_at: NaiveDateTime,
}

/// Partial provider update. Credentials cannot be changed through this
/// path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub specialty: Option<String>,
    pub years_of_experience: Option<i64>,
}
