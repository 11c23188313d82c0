//! Entity ID generation.
//!
//! IDs are `<prefix>-<hash>` where the hash is the base36 encoding of the
//! first 8 bytes of a SHA-256 over the entity's seed fields. Deterministic
//! for a given seed; a nonce loop handles the (rare) collision.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Prefix for issue IDs.
pub const ISSUE_PREFIX: &str = "cv";
/// Prefix for user IDs.
pub const USER_PREFIX: &str = "usr";
/// Prefix for volunteer IDs.
pub const VOLUNTEER_PREFIX: &str = "vol";

/// Hash length in base36 characters.
const HASH_LEN: usize = 12;

/// Generate a unique ID with the given prefix.
///
/// `exists` is consulted to avoid collisions; the nonce is bumped until a
/// free ID is found.
pub fn generate_id<F>(prefix: &str, seed_parts: &[&str], created_at: DateTime<Utc>, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut nonce = 0u32;
    loop {
        let seed = generate_id_seed(seed_parts, created_at, nonce);
        let hash = compute_id_hash(&seed, HASH_LEN);
        let id = format!("{prefix}-{hash}");

        if !exists(&id) {
            return id;
        }

        nonce += 1;

        // Safety break: append the nonce to guarantee uniqueness
        if nonce > 1000 {
            return format!("{prefix}-{hash}-{nonce}");
        }
    }
}

/// Generate the seed string for ID generation.
///
/// Inputs: `parts.. | created_at (ns) | nonce`
#[must_use]
pub fn generate_id_seed(parts: &[&str], created_at: DateTime<Utc>, nonce: u32) -> String {
    format!(
        "{}|{}|{}",
        parts.join("|"),
        created_at.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

/// Compute a base36 hash of the input string with a specific length.
///
/// Uses SHA-256 to hash the input, then converts the first 8 bytes to a
/// u64, encodes as base36, and truncates to the requested length.
#[must_use]
pub fn compute_id_hash(input: &str, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();

    let mut num = 0u64;
    for &byte in result.iter().take(8) {
        num = (num << 8) | u64::from(byte);
    }

    let mut s = base36_encode(num);
    if s.len() < length {
        s = format!("{s:0>length$}");
    }

    s.chars().take(length).collect()
}

fn base36_encode(mut num: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if num == 0 {
        return "0".to_string();
    }
    let mut chars = Vec::new();
    while num > 0 {
        chars.push(ALPHABET[(num % 36) as usize] as char);
        num /= 36;
    }
    chars.into_iter().rev().collect()
}

/// Check that an ID has the expected `<prefix>-<hash>` shape.
#[must_use]
pub fn is_valid_id(id: &str, prefix: &str) -> bool {
    match id.split_once('-') {
        Some((p, hash)) => {
            p == prefix
                && !hash.is_empty()
                && hash
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        }
        None => false,
    }
}
