use sha2::{Digest, Sha256};

/// Hex SHA-256 of a fetched payload. Two runs over the same feed bytes
/// report the same value.
pub fn payload_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
