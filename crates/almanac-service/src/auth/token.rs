//! Random secrets for bearer tokens and access keys.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use almanac_core::constants::{ACCESS_KEY_BYTES, API_TOKEN_BYTES};

fn random_url_safe(bytes: usize) -> String {
    let mut buf = vec![0_u8; bytes];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Generates a new plaintext bearer token.
#[must_use]
pub fn generate_api_token() -> String {
    random_url_safe(API_TOKEN_BYTES)
}

/// Generates a new 40 character access key.
#[must_use]
pub fn generate_access_key() -> String {
    random_url_safe(ACCESS_KEY_BYTES)
}

/// SHA-256 hex digest of a plaintext token, as stored in `api_token.token_hash`.
#[must_use]
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
