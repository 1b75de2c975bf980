//! Vitaltrack — a patient/provider health-tracking service.
//!
//! Patients own a current vitals snapshot and an append-only history of
//! superseded snapshots; providers are credentialed accounts with
//! professional metadata. The `health` module holds the pure domain logic
//! (threshold triage classification and submission validation), `db` the
//! SQLite persistence, and `api` the axum REST surface.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod db;
pub mod health;
pub mod models;
