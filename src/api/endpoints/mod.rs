//! API endpoint handlers, one module per resource.

pub mod auth;
pub mod patients;
pub mod providers;
