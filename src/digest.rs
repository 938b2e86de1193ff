//! Content hashing for audit records

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of raw bytes
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
