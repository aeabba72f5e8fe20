//! Password hashing with a scheme-migration path.
//!
//! New hashes are always bcrypt. The legacy SHA-256 hex digest
//! (`sha256$<hex>`) exists only to verify rows migrated from deployments
//! where the bcrypt primitive was unavailable; [`hash_password`] never
//! produces it.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// bcrypt ignores input past 72 bytes; truncate deterministically so hash
/// and verify agree on long inputs.
const BCRYPT_MAX_BYTES: usize = 72;

const LEGACY_PREFIX: &str = "sha256$";

/// A stored password hash, tagged by scheme.
///
/// The discriminator is part of the stored format: bcrypt strings carry the
/// `$2` modular-crypt prefix, legacy digests the explicit `sha256$` tag.
/// Verification dispatches on the parsed variant, never on caller-supplied
/// scheme hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredHash {
    Bcrypt(String),
    LegacyDigest(String),
}

impl StoredHash {
    #[must_use]
    pub fn parse(stored: &str) -> Option<Self> {
        if let Some(digest) = stored.strip_prefix(LEGACY_PREFIX) {
            return Some(Self::LegacyDigest(digest.to_string()));
        }
        if stored.starts_with("$2") {
            return Some(Self::Bcrypt(stored.to_string()));
        }
        None
    }
}

fn truncated(plaintext: &str) -> &[u8] {
    let bytes = plaintext.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)]
}

/// Hash a plaintext password with bcrypt.
///
/// # Errors
/// Returns an error if the bcrypt primitive fails.
pub fn hash_password(plaintext: &str) -> Result<String> {
    bcrypt::hash(truncated(plaintext), bcrypt::DEFAULT_COST).context("failed to hash password")
}

/// Verify a plaintext password against a stored hash.
///
/// Unknown hash formats fail verification rather than erroring out; a
/// malformed stored hash must never grant access.
#[must_use]
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    match StoredHash::parse(stored) {
        Some(StoredHash::Bcrypt(hash)) => {
            bcrypt::verify(truncated(plaintext), &hash).unwrap_or(false)
        }
        Some(StoredHash::LegacyDigest(digest)) => {
            hex::encode(Sha256::digest(plaintext.as_bytes())) == digest
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_hash(plaintext: &str) -> String {
        format!("{LEGACY_PREFIX}{}", hex::encode(Sha256::digest(plaintext.as_bytes())))
    }

    #[test]
    fn bcrypt_roundtrip() -> Result<()> {
        let hash = hash_password("correct horse battery staple")?;
        assert!(hash.starts_with("$2"));
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
        Ok(())
    }

    #[test]
    fn stored_hash_discriminator() {
        assert_eq!(
            StoredHash::parse("sha256$abcdef"),
            Some(StoredHash::LegacyDigest("abcdef".to_string()))
        );
        assert!(matches!(
            StoredHash::parse("$2b$12$abcdefghijklmnopqrstuv"),
            Some(StoredHash::Bcrypt(_))
        ));
        assert_eq!(StoredHash::parse("md5$nope"), None);
        assert_eq!(StoredHash::parse(""), None);
    }

    #[test]
    fn legacy_digest_verifies() {
        let stored = legacy_hash("admin123");
        assert!(verify_password("admin123", &stored));
        assert!(!verify_password("admin124", &stored));
    }

    #[test]
    fn unknown_format_never_verifies() {
        assert!(!verify_password("anything", "plaintext-not-a-hash"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn long_passwords_truncate_consistently() -> Result<()> {
        // Two passwords sharing the first 72 bytes hash and verify the same.
        let base = "x".repeat(BCRYPT_MAX_BYTES);
        let longer = format!("{base}tail");
        let hash = hash_password(&longer)?;
        assert!(verify_password(&base, &hash));
        assert!(verify_password(&longer, &hash));
        Ok(())
    }

    #[test]
    fn legacy_digest_is_never_issued() -> Result<()> {
        let hash = hash_password("admin123")?;
        assert!(!hash.starts_with(LEGACY_PREFIX));
        Ok(())
    }
}
