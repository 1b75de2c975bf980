//! Shared types for the API layer.

use std::sync::Arc;

use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::session::Role;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware after successful token validation.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}
