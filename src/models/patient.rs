use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vitals::{BloodPressure, Vitals};

/// A patient account. The credential hash lives only in the database layer
/// and never appears on this struct, so serializing a patient can never
/// leak it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub health_data: Vitals,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial demographic update. Vitals sub-fields set here overwrite the
/// current slot directly, without range validation and without a history
/// append; the validated path is the health-data update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub health_data: Option<VitalsPatch>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalsPatch {
    pub heart_rate: Option<i64>,
    pub blood_pressure: Option<BloodPressure>,
    pub glucose: Option<i64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
}

impl VitalsPatch {
    /// Apply the provided sub-fields over the current vitals.
    pub fn apply_to(&self, current: &Vitals) -> Vitals {
        Vitals {
            heart_rate: self.heart_rate.unwrap_or(current.heart_rate),
            blood_pressure: self.blood_pressure.unwrap_or(current.blood_pressure),
            glucose: self.glucose.unwrap_or(current.glucose),
            weight: self.weight.unwrap_or(current.weight),
            height: self.height.unwrap_or(current.height),
        }
    }
}
