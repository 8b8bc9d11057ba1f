//! Link token generation and access-code comparison.

use sha2::{Digest, Sha256};

/// Length of a link token in hex characters.
pub const TOKEN_LEN: usize = 32;

/// Generate a link token: 128 CSPRNG bits rendered as 32 lowercase hex
/// characters in the `xxxxxxxxxxxx4xxxyxxxxxxxxxxxxxxx` layout, where
/// `y` is one of `8`, `9`, `a`, `b`.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let mut bytes: [u8; 16] = rand::Rng::random(&mut rng);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    hex::encode(bytes)
}

/// Cheap shape check run before any store lookup.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Compare an access code in time independent of where the inputs
/// first differ. Both sides are hashed first so length is hidden too.
pub fn codes_match(supplied: &str, expected: &str) -> bool {
    let a = Sha256::digest(supplied.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
