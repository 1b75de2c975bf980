use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Baseline values written when a patient registers, before any real
/// measurement has been entered.
pub const BASELINE_HEART_RATE: i64 = 72;
pub const BASELINE_SYSTOLIC: i64 = 120;
pub const BASELINE_DIASTOLIC: i64 = 80;
pub const BASELINE_GLUCOSE: i64 = 95;
pub const BASELINE_WEIGHT: f64 = 70.0;
pub const BASELINE_HEIGHT: f64 = 170.0;

/// A blood pressure reading in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: i64,
    pub diastolic: i64,
}

/// A patient's current vitals. Always fully populated; new patients start
/// at the baseline values. Height is stored but kept off the wire, matching
/// the health-data response shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub heart_rate: i64,
    pub blood_pressure: BloodPressure,
    pub glucose: i64,
    pub weight: f64,
    #[serde(skip_serializing, default = "default_height")]
    pub height: f64,
}

fn default_height() -> f64 {
    BASELINE_HEIGHT
}

impl Vitals {
    pub fn baseline() -> Self {
        Self {
            heart_rate: BASELINE_HEART_RATE,
            blood_pressure: BloodPressure {
                systolic: BASELINE_SYSTOLIC,
                diastolic: BASELINE_DIASTOLIC,
            },
            glucose: BASELINE_GLUCOSE,
            weight: BASELINE_WEIGHT,
            height: BASELINE_HEIGHT,
        }
    }

    /// True when every field still equals its registration baseline,
    /// i.e. the patient has never entered real data. Login surfaces this
    /// so the client can prompt for a first measurement.
    pub fn is_baseline(&self) -> bool {
        *self == Self::baseline()
    }

    /// Partial view of these vitals for classification.
    pub fn reading(&self) -> VitalsReading {
        VitalsReading {
            heart_rate: Some(self.heart_rate),
            blood_pressure: Some(BloodPressureReading {
                systolic: Some(self.blood_pressure.systolic),
                diastolic: Some(self.blood_pressure.diastolic),
            }),
            glucose: Some(self.glucose),
            weight: Some(self.weight),
        }
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::baseline()
    }
}

/// A vitals snapshot as seen by the classifier: any field, including the
/// blood pressure sub-fields, may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalsReading {
    pub heart_rate: Option<i64>,
    pub blood_pressure: Option<BloodPressureReading>,
    pub glucose: Option<i64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloodPressureReading {
    pub systolic: Option<i64>,
    pub diastolic: Option<i64>,
}

impl VitalsReading {
    pub fn systolic(&self) -> Option<i64> {
        self.blood_pressure.and_then(|bp| bp.systolic)
    }

    pub fn diastolic(&self) -> Option<i64> {
        self.blood_pressure.and_then(|bp| bp.diastolic)
    }
}

/// An archived vitals snapshot, written at the moment new vitals supersede
/// it. History never records height.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: NaiveDateTime,
    pub heart_rate: i64,
    pub blood_pressure: BloodPressure,
    pub glucose: i64,
    pub weight: f64,
}
