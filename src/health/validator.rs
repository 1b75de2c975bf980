//! Validation and normalization of a raw health-data submission.
//!
//! A submission arrives form-shaped: numbers may be JSON numbers or numeric
//! strings, blood pressure is a single "systolic/diastolic" string. The
//! validator either produces fully typed vitals or a field→message map so a
//! form can highlight every offending input at once. It never touches
//! storage; a rejected submission has no side effects.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::models::{BloodPressure, Vitals};

pub const HEART_RATE_MIN: i64 = 30;
pub const HEART_RATE_MAX: i64 = 200;
pub const SYSTOLIC_MIN: i64 = 70;
pub const SYSTOLIC_MAX: i64 = 250;
pub const DIASTOLIC_MIN: i64 = 40;
pub const DIASTOLIC_MAX: i64 = 150;
pub const GLUCOSE_MIN: i64 = 50;
pub const GLUCOSE_MAX: i64 = 500;
pub const WEIGHT_MIN: f64 = 20.0;
pub const WEIGHT_MAX: f64 = 500.0;

/// Per-field validation messages, keyed by the wire field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// A numeric form value: clients send both `"heartRate": 75` and
/// `"heartRate": "75"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumericField::Number(n) if n.is_finite() => Some(*n),
            NumericField::Number(_) => None,
            NumericField::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// An empty form input counts as missing, not malformed.
    fn is_blank(&self) -> bool {
        matches!(self, NumericField::Text(s) if s.trim().is_empty())
    }
}

/// Raw health-data submission, before any validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalsSubmission {
    pub heart_rate: Option<NumericField>,
    pub blood_pressure: Option<String>,
    pub glucose: Option<NumericField>,
    pub weight: Option<NumericField>,
    pub height: Option<NumericField>,
}

/// A submission that passed validation. Heart rate and glucose are stored
/// as whole numbers (fractional input truncates toward zero); height is
/// optional and carries over from the current vitals when absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedVitals {
    pub heart_rate: i64,
    pub blood_pressure: BloodPressure,
    pub glucose: i64,
    pub weight: f64,
    pub height: Option<f64>,
}

impl ValidatedVitals {
    /// Produce the new current vitals, keeping the stored height when the
    /// submission did not include one.
    pub fn merged_with(self, current: &Vitals) -> Vitals {
        Vitals {
            heart_rate: self.heart_rate,
            blood_pressure: self.blood_pressure,
            glucose: self.glucose,
            weight: self.weight,
            height: self.height.unwrap_or(current.height),
        }
    }
}

fn pressure_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+/\d+$").expect("valid pressure pattern"))
}

/// Validate a submission. Returns the typed vitals, or the complete map of
/// field errors — every failing field is reported, nothing is applied.
pub fn validate(submission: &VitalsSubmission) -> Result<ValidatedVitals, FieldErrors> {
    let mut errors = FieldErrors::new();

    let heart_rate = match &submission.heart_rate {
        None => {
            errors.insert("heartRate", "Heart rate is required".into());
            None
        }
        Some(raw) if raw.is_blank() => {
            errors.insert("heartRate", "Heart rate is required".into());
            None
        }
        Some(raw) => match raw.as_f64() {
            Some(n) if (HEART_RATE_MIN as f64..=HEART_RATE_MAX as f64).contains(&n) => {
                Some(n.trunc() as i64)
            }
            _ => {
                errors.insert(
                    "heartRate",
                    "Please enter a valid heart rate (30-200 bpm)".into(),
                );
                None
            }
        },
    };

    let blood_pressure = match submission.blood_pressure.as_deref() {
        None | Some("") => {
            errors.insert("bloodPressure", "Blood pressure is required".into());
            None
        }
        Some(raw) => validate_blood_pressure(raw).map_or_else(
            |message| {
                errors.insert("bloodPressure", message);
                None
            },
            Some,
        ),
    };

    let glucose = match &submission.glucose {
        None => {
            errors.insert("glucose", "Glucose level is required".into());
            None
        }
        Some(raw) if raw.is_blank() => {
            errors.insert("glucose", "Glucose level is required".into());
            None
        }
        Some(raw) => match raw.as_f64() {
            Some(n) if (GLUCOSE_MIN as f64..=GLUCOSE_MAX as f64).contains(&n) => {
                Some(n.trunc() as i64)
            }
            _ => {
                errors.insert(
                    "glucose",
                    "Please enter a valid glucose level (50-500 mg/dL)".into(),
                );
                None
            }
        },
    };

    let weight = match &submission.weight {
        None => {
            errors.insert("weight", "Weight is required".into());
            None
        }
        Some(raw) if raw.is_blank() => {
            errors.insert("weight", "Weight is required".into());
            None
        }
        Some(raw) => match raw.as_f64() {
            Some(n) if (WEIGHT_MIN..=WEIGHT_MAX).contains(&n) => Some(n),
            _ => {
                errors.insert("weight", "Please enter a valid weight (20-500 kg)".into());
                None
            }
        },
    };

    // Unvalidated pass-through; an unparseable height is treated as absent.
    let height = submission.height.as_ref().and_then(NumericField::as_f64);

    match (heart_rate, blood_pressure, glucose, weight) {
        (Some(heart_rate), Some(blood_pressure), Some(glucose), Some(weight))
            if errors.is_empty() =>
        {
            Ok(ValidatedVitals {
                heart_rate,
                blood_pressure,
                glucose,
                weight,
                height,
            })
        }
        _ => Err(errors),
    }
}

/// Check the "systolic/diastolic" string: format first, then each range,
/// then the cross-field constraint. The first failing constraint names
/// itself in the returned message.
fn validate_blood_pressure(raw: &str) -> Result<BloodPressure, String> {
    if !pressure_pattern().is_match(raw) {
        return Err(
            "Please enter blood pressure in format systolic/diastolic (e.g., 120/80)".into(),
        );
    }

    let (sys_raw, dia_raw) = raw.split_once('/').expect("pattern guarantees one slash");
    let systolic = sys_raw.parse::<i64>().ok();
    let diastolic = dia_raw.parse::<i64>().ok();

    let systolic = match systolic {
        Some(s) if (SYSTOLIC_MIN..=SYSTOLIC_MAX).contains(&s) => s,
        _ => return Err("Systolic pressure should be between 70 and 250".into()),
    };
    let diastolic = match diastolic {
        Some(d) if (DIASTOLIC_MIN..=DIASTOLIC_MAX).contains(&d) => d,
        _ => return Err("Diastolic pressure should be between 40 and 150".into()),
    };
    if systolic <= diastolic {
        return Err("Systolic pressure should be higher than diastolic pressure".into());
    }

    Ok(BloodPressure {
        systolic,
        diastolic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(hr: &str, bp: &str, glucose: &str, weight: &str) -> VitalsSubmission {
        serde_json::from_str(&format!(
            r#"{{"heartRate": {hr}, "bloodPressure": "{bp}", "glucose": {glucose}, "weight": {weight}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn accepts_a_typical_submission() {
        let v = validate(&submission("75", "118/76", "100", "68.5")).unwrap();
        assert_eq!(v.heart_rate, 75);
        assert_eq!(v.blood_pressure.systolic, 118);
        assert_eq!(v.blood_pressure.diastolic, 76);
        assert_eq!(v.glucose, 100);
        assert_eq!(v.weight, 68.5);
        assert!(v.height.is_none());
    }

    #[test]
    fn accepts_numeric_strings() {
        let raw = r#"{"heartRate":"75","bloodPressure":"118/76","glucose":"100","weight":"68.5"}"#;
        let sub: VitalsSubmission = serde_json::from_str(raw).unwrap();
        let v = validate(&sub).unwrap();
        assert_eq!(v.heart_rate, 75);
        assert_eq!(v.weight, 68.5);
    }

    #[test]
    fn fractional_heart_rate_truncates() {
        let v = validate(&submission("75.9", "120/80", "99.5", "70")).unwrap();
        assert_eq!(v.heart_rate, 75);
        assert_eq!(v.glucose, 99);
    }

    #[test]
    fn missing_fields_each_get_a_required_error() {
        let errors = validate(&VitalsSubmission::default()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["heartRate"], "Heart rate is required");
        assert_eq!(errors["bloodPressure"], "Blood pressure is required");
        assert_eq!(errors["glucose"], "Glucose level is required");
        assert_eq!(errors["weight"], "Weight is required");
    }

    #[test]
    fn blank_form_values_count_as_missing() {
        let raw = r#"{"heartRate":"", "bloodPressure":"", "glucose":"  ", "weight":""}"#;
        let sub: VitalsSubmission = serde_json::from_str(raw).unwrap();
        let errors = validate(&sub).unwrap_err();
        assert_eq!(errors["heartRate"], "Heart rate is required");
        assert_eq!(errors["bloodPressure"], "Blood pressure is required");
        assert_eq!(errors["glucose"], "Glucose level is required");
        assert_eq!(errors["weight"], "Weight is required");
    }

    #[test]
    fn heart_rate_out_of_range_is_rejected() {
        for hr in ["29", "201", "\"fast\""] {
            let errors = validate(&submission(hr, "120/80", "95", "70")).unwrap_err();
            assert_eq!(
                errors["heartRate"],
                "Please enter a valid heart rate (30-200 bpm)"
            );
        }
        assert!(validate(&submission("30", "120/80", "95", "70")).is_ok());
        assert!(validate(&submission("200", "120/80", "95", "70")).is_ok());
    }

    #[test]
    fn pressure_without_slash_is_a_format_error() {
        let errors = validate(&submission("75", "120", "95", "70")).unwrap_err();
        assert_eq!(
            errors["bloodPressure"],
            "Please enter blood pressure in format systolic/diastolic (e.g., 120/80)"
        );
    }

    #[test]
    fn pressure_with_junk_is_a_format_error() {
        for bp in ["120/80/60", "abc/80", "120-80", "120/ 80"] {
            let errors = validate(&submission("75", bp, "95", "70")).unwrap_err();
            assert_eq!(
                errors["bloodPressure"],
                "Please enter blood pressure in format systolic/diastolic (e.g., 120/80)",
                "expected format error for {bp:?}"
            );
        }
    }

    #[test]
    fn pressure_ranges_name_the_failing_side() {
        let errors = validate(&submission("75", "260/80", "95", "70")).unwrap_err();
        assert_eq!(
            errors["bloodPressure"],
            "Systolic pressure should be between 70 and 250"
        );

        let errors = validate(&submission("75", "120/30", "95", "70")).unwrap_err();
        assert_eq!(
            errors["bloodPressure"],
            "Diastolic pressure should be between 40 and 150"
        );
    }

    #[test]
    fn inverted_pressure_is_a_cross_field_error() {
        let errors = validate(&submission("75", "80/120", "95", "70")).unwrap_err();
        assert_eq!(
            errors["bloodPressure"],
            "Systolic pressure should be higher than diastolic pressure"
        );

        // Equal values fail the strict comparison too.
        let errors = validate(&submission("75", "90/90", "95", "70")).unwrap_err();
        assert_eq!(
            errors["bloodPressure"],
            "Systolic pressure should be higher than diastolic pressure"
        );
    }

    #[test]
    fn glucose_and_weight_ranges() {
        let errors = validate(&submission("75", "120/80", "501", "70")).unwrap_err();
        assert_eq!(
            errors["glucose"],
            "Please enter a valid glucose level (50-500 mg/dL)"
        );

        let errors = validate(&submission("75", "120/80", "95", "19.9")).unwrap_err();
        assert_eq!(errors["weight"], "Please enter a valid weight (20-500 kg)");
        assert!(validate(&submission("75", "120/80", "95", "20")).is_ok());
    }

    #[test]
    fn every_failing_field_is_reported_together() {
        let errors = validate(&submission("500", "120", "40", "1000")).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains_key("heartRate"));
        assert!(errors.contains_key("bloodPressure"));
        assert!(errors.contains_key("glucose"));
        assert!(errors.contains_key("weight"));
    }

    #[test]
    fn height_passes_through_unvalidated() {
        let raw = r#"{"heartRate":75,"bloodPressure":"118/76","glucose":100,"weight":68.5,"height":181.5}"#;
        let sub: VitalsSubmission = serde_json::from_str(raw).unwrap();
        let v = validate(&sub).unwrap();
        assert_eq!(v.height, Some(181.5));
    }

    #[test]
    fn merge_keeps_stored_height_when_absent() {
        let current = Vitals {
            height: 181.5,
            ..Vitals::baseline()
        };
        let v = validate(&submission("75", "118/76", "100", "68.5")).unwrap();
        let merged = v.merged_with(&current);
        assert_eq!(merged.height, 181.5);
        assert_eq!(merged.heart_rate, 75);
        assert_eq!(merged.weight, 68.5);
    }

    #[test]
    fn rejection_reports_no_partial_result() {
        // One bad field rejects the whole submission.
        let result = validate(&submission("75", "80/120", "95", "70"));
        assert!(result.is_err());
    }
}
