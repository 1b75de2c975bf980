use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::AuthError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 32;

/// Hash a password with a fresh random salt using PBKDF2-SHA256.
/// Encoded as `base64(salt)$base64(derived)`.
pub fn hash_password(password: &str) -> String {
    let salt = generate_salt();
    let derived = derive(password, &salt);
    let engine = base64::engine::general_purpose::STANDARD;
    format!("{}${}", engine.encode(salt), engine.encode(derived))
}

/// Verify a password against a stored hash in constant time.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let (salt_b64, hash_b64) = stored.split_once('$').ok_or(AuthError::MalformedHash)?;
    let engine = base64::engine::general_purpose::STANDARD;

    let salt: [u8; SALT_LENGTH] = engine
        .decode(salt_b64)
        .map_err(|_| AuthError::MalformedHash)?
        .try_into()
        .map_err(|_| AuthError::MalformedHash)?;
    let expected: [u8; HASH_LENGTH] = engine
        .decode(hash_b64)
        .map_err(|_| AuthError::MalformedHash)?
        .try_into()
        .map_err(|_| AuthError::MalformedHash)?;

    let derived = derive(password, &salt);
    Ok(derived.ct_eq(&expected).into())
}

fn derive(password: &str, salt: &[u8; SALT_LENGTH]) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

/// Generate a cryptographically random salt
fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
