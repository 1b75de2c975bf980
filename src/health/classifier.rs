//! Threshold classification of a vitals reading into a condition label and
//! a severity status, used by provider-facing views for triage sorting.
//! Labels are derived at read time and never persisted.

use serde::{Deserialize, Serialize};

use crate::models::VitalsReading;

/// Likely clinical concern category for a vitals reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "Cardiac Issue")]
    CardiacIssue,
    #[serde(rename = "Hypertensive Crisis")]
    HypertensiveCrisis,
    #[serde(rename = "Hypotension")]
    Hypotension,
    #[serde(rename = "Diabetic Emergency")]
    DiabeticEmergency,
    #[serde(rename = "Heart Condition")]
    HeartCondition,
    #[serde(rename = "High Blood Pressure")]
    HighBloodPressure,
    #[serde(rename = "Blood Sugar Concern")]
    BloodSugarConcern,
    #[serde(rename = "General Health")]
    GeneralHealth,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::CardiacIssue => "Cardiac Issue",
            Condition::HypertensiveCrisis => "Hypertensive Crisis",
            Condition::Hypotension => "Hypotension",
            Condition::DiabeticEmergency => "Diabetic Emergency",
            Condition::HeartCondition => "Heart Condition",
            Condition::HighBloodPressure => "High Blood Pressure",
            Condition::BloodSugarConcern => "Blood Sugar Concern",
            Condition::GeneralHealth => "General Health",
        }
    }
}

/// Severity status for provider-side sorting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Critical,
    Improving,
    Stable,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Critical => "Critical",
            Status::Improving => "Improving",
            Status::Stable => "Stable",
        }
    }
}

fn above(value: Option<i64>, threshold: i64) -> bool {
    value.is_some_and(|v| v > threshold)
}

fn below(value: Option<i64>, threshold: i64) -> bool {
    value.is_some_and(|v| v < threshold)
}

/// Condition rules in precedence order: the first matching predicate wins,
/// so the more severe ranges must stay ahead of the milder ones that
/// overlap them (a heart rate of 130 is a Cardiac Issue, never a Heart
/// Condition). A missing field matches no threshold.
const CONDITION_RULES: &[(fn(&VitalsReading) -> bool, Condition)] = &[
    (
        |r| above(r.heart_rate, 120) || below(r.heart_rate, 50),
        Condition::CardiacIssue,
    ),
    (
        |r| above(r.systolic(), 180) || above(r.diastolic(), 120),
        Condition::HypertensiveCrisis,
    ),
    (
        |r| below(r.systolic(), 90) || below(r.diastolic(), 60),
        Condition::Hypotension,
    ),
    (
        |r| above(r.glucose, 300) || below(r.glucose, 70),
        Condition::DiabeticEmergency,
    ),
    (
        |r| above(r.heart_rate, 100) || below(r.heart_rate, 60),
        Condition::HeartCondition,
    ),
    (
        |r| above(r.systolic(), 140) || above(r.diastolic(), 90),
        Condition::HighBloodPressure,
    ),
    (
        |r| above(r.glucose, 180) || below(r.glucose, 80),
        Condition::BloodSugarConcern,
    ),
];

/// Status rules in precedence order. "Improving" is a historical label: it
/// fires on mild deviation from the ideal band in either direction, so a
/// low heart rate lands there too. The thresholds are kept literal.
const STATUS_RULES: &[(fn(&VitalsReading) -> bool, Status)] = &[
    (
        |r| {
            above(r.heart_rate, 130)
                || below(r.heart_rate, 45)
                || above(r.systolic(), 190)
                || above(r.diastolic(), 130)
                || below(r.systolic(), 80)
                || below(r.diastolic(), 50)
                || above(r.glucose, 400)
                || below(r.glucose, 60)
        },
        Status::Critical,
    ),
    (
        |r| {
            above(r.heart_rate, 95)
                || below(r.heart_rate, 65)
                || above(r.systolic(), 130)
                || above(r.diastolic(), 85)
                || below(r.systolic(), 100)
                || below(r.diastolic(), 65)
                || above(r.glucose, 150)
                || below(r.glucose, 90)
        },
        Status::Improving,
    ),
];

/// Derive the condition label for a reading. `None` (no reading at all)
/// classifies as General Health.
pub fn condition(reading: Option<&VitalsReading>) -> Condition {
    let Some(reading) = reading else {
        return Condition::GeneralHealth;
    };
    CONDITION_RULES
        .iter()
        .find(|(matches, _)| matches(reading))
        .map(|&(_, label)| label)
        .unwrap_or(Condition::GeneralHealth)
}

/// Derive the severity status for a reading. `None` classifies as Stable.
pub fn status(reading: Option<&VitalsReading>) -> Status {
    let Some(reading) = reading else {
        return Status::Stable;
    };
    STATUS_RULES
        .iter()
        .find(|(matches, _)| matches(reading))
        .map(|&(_, label)| label)
        .unwrap_or(Status::Stable)
}
