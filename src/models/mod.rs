pub mod patient;
pub mod provider;
pub mod vitals;

pub use patient::{Patient, PatientUpdate, VitalsPatch};
pub use provider::{Provider, ProviderUpdate};
pub use vitals::{BloodPressure, BloodPressureReading, HistoryEntry, Vitals, VitalsReading};
