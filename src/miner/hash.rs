// src/miner/hash.rs
//! Proof-of-work digest and target checks
//!
//! The digest input is the UTF-8 payload immediately followed by the decimal
//! ASCII rendering of the nonce, with no separator. The digest is rendered
//! as 64 lowercase hex characters.

use crate::utils::error::MinerError;
use sha2::{Digest, Sha256};

/// Largest difficulty that can be satisfied: every character of the hex digest
pub const MAX_DIFFICULTY: u32 = 64;

/// Computes the lowercase hex SHA-256 digest of `payload ++ decimal(nonce)`
///
/// # Example
/// ```
/// use pow_sim_rs::miner::hash::calculate_hash;
/// assert_eq!(
///     calculate_hash("test", 0),
///     "590c9f8430c7435807df8ba9a476e3f1295d46ef210f6efae2043a4c085a569e"
/// );
/// ```
pub fn calculate_hash(payload: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds the required prefix: `difficulty` repetitions of `'0'`
pub fn target_prefix(difficulty: u32) -> String {
    "0".repeat(difficulty as usize)
}

/// Returns `true` if the first `difficulty` characters of `digest` are `'0'`
pub fn meets_difficulty(digest: &str, difficulty: u32) -> bool {
    let required = difficulty as usize;
    digest.len() >= required && digest.bytes().take(required).all(|b| b == b'0')
}

/// Rejects difficulties that no 64-character digest could ever satisfy
pub fn validate_difficulty(difficulty: u32) -> Result<u32, MinerError> {
    if difficulty > MAX_DIFFICULTY {
        return Err(MinerError::InvalidDifficulty(difficulty));
    }
    Ok(difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn digest_matches_reference_vectors() {
        assert_eq!(
            hex::decode(calculate_hash("test", 0)).unwrap(),
            hex!("590c9f8430c7435807df8ba9a476e3f1295d46ef210f6efae2043a4c085a569e")
        );
        assert_eq!(
            hex::decode(calculate_hash("test", 1)).unwrap(),
            hex!("1b4f0e9851971998e732078544c96b36c3d01cedf7caa332359d6f1d83567014")
        );
        assert_eq!(
            calculate_hash("Block data", 1),
            "c26c8066940043e99551d00343acba7aa922c7dfb1767184150fc808b2f118d5"
        );
    }

    #[test]
    fn digest_is_deterministic_and_lowercase() {
        let a = calculate_hash("payload", 42);
        let b = calculate_hash("payload", 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn known_nonces_meet_difficulty() {
        assert!(meets_difficulty(&calculate_hash("Block data", 37), 2));
        assert!(meets_difficulty(&calculate_hash("Block data", 1337), 3));
        assert!(meets_difficulty(&calculate_hash("Block data", 86414), 4));
        assert!(meets_difficulty(&calculate_hash("test", 304), 2));
        assert!(!meets_difficulty(&calculate_hash("test", 0), 1));
    }

    #[test]
    fn zero_difficulty_accepts_everything() {
        assert!(meets_difficulty(&calculate_hash("anything", 1), 0));
        assert_eq!(target_prefix(0), "");
    }

    #[test]
    fn prefix_and_validation() {
        assert_eq!(target_prefix(4), "0000");
        assert!(meets_difficulty("0000abcd", 4));
        assert!(!meets_difficulty("000abcde", 4));
        assert!(!meets_difficulty("00", 3));
        assert!(validate_difficulty(64).is_ok());
        assert!(matches!(
            validate_difficulty(65),
            Err(MinerError::InvalidDifficulty(65))
        ));
    }
}
