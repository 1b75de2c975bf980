use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Login sessions expire after seven days.
const SESSION_TTL_DAYS: i64 = 7;

/// Which kind of account a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Patient,
    Provider,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Provider => "provider",
        }
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: Uuid,
    role: Role,
    expires_at: DateTime<Utc>,
}

/// In-memory bearer-token session store. Tokens are random 32-byte values
/// handed to the client once; only their SHA-256 hashes are kept here.
pub struct SessionRegistry {
    sessions: HashMap<[u8; 32], SessionEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Issue a session token for a logged-in user.
    pub fn issue(&mut self, user_id: Uuid, role: Role) -> String {
        // Periodic cleanup when the registry grows large
        if self.sessions.len() > 1000 {
            self.cleanup();
        }

        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                user_id,
                role,
                expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
            },
        );
        token
    }

    /// Validate a presented token. Returns the session's identity, or
    /// `None` for unknown and expired tokens (expired ones are dropped).
    pub fn validate(&mut self, token: &str) -> Option<(Uuid, Role)> {
        let key = hash_token(token);
        let entry = self.sessions.get(&key)?;
        if entry.expires_at <= Utc::now() {
            self.sessions.remove(&key);
            return None;
        }
        Some((entry.user_id, entry.role))
    }

    /// Revoke every session belonging to a user (account deletion).
    pub fn revoke_user(&mut self, user_id: &Uuid) {
        self.sessions.retain(|_, entry| entry.user_id != *user_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn cleanup(&mut self) {
        let now = Utc::now();
        self.sessions.retain(|_, entry| entry.expires_at > now);
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
