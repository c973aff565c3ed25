//! Password and secret utilities

use argon2::Argon2;
use argon2::password_hash;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use rand_core::OsRng;
use rand_core::TryRngCore;

/// Alphabet for invite codes, without look-alike characters
const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a generated invite code
pub const INVITE_CODE_LENGTH: usize = 8;

/// Fill a buffer with bytes from the operating system
fn random_bytes<const N: usize>() -> Result<[u8; N], password_hash::Error> {
    let mut bytes = [0u8; N];

    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| password_hash::Error::Crypto)?;

    Ok(bytes)
}

/// Generate a new random salt
fn generate_salt() -> Result<SaltString, password_hash::Error> {
    SaltString::encode_b64(&random_bytes::<16>()?)
}

/// Generate a new random secret
pub fn generate() -> Result<String, password_hash::Error> {
    generate_salt().map(|salt| salt.to_string())
}

/// Generate an invite code for a relationship
pub fn generate_invite_code() -> Result<String, password_hash::Error> {
    let bytes = random_bytes::<INVITE_CODE_LENGTH>()?;

    Ok(bytes
        .iter()
        .map(|byte| {
            let index = usize::from(*byte) % INVITE_CODE_ALPHABET.len();
            char::from(INVITE_CODE_ALPHABET[index])
        })
        .collect())
}

/// Hash a given password
pub fn hash(password: &str) -> Result<String, password_hash::Error> {
    let salt = generate_salt()?;

    let argon2 = Argon2::default();

    let hashed_password = argon2.hash_password(password.as_bytes(), &salt)?;

    Ok(hashed_password.to_string())
}

/// Verify a given password against a given hash
///
/// An unparsable hash never verifies
pub fn verify(hashed_password: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hashed_password) else {
        return false;
    };

    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
