//! Credential handling: salted PBKDF2 password hashes and the in-memory
//! bearer-token session registry backing login.

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password};
pub use session::{Role, SessionRegistry};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Stored credential hash is malformed")]
    MalformedHash,
}
