//! Health-domain logic: the triage classifier and the vitals submission
//! validator. Both are pure — persistence stays in `db::repository`.

pub mod classifier;
pub mod validator;

pub use classifier::{condition, status, Condition, Status};
pub use validator::{validate, FieldErrors, ValidatedVitals, VitalsSubmission};
