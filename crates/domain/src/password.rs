//! One-way password hashing.
//!
//! The stored form is `salt$digest`, both hex-encoded; the digest is
//! SHA-256 over the raw salt bytes followed by the password bytes. Events
//! carry only this form, never the cleartext.

use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

fn digest_hex(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    format!("{}${}", hex::encode(salt), digest_hex(&salt, password))
}

/// Verifies a cleartext password against a stored `salt$digest` hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    digest_hex(&salt, password) == digest
}
