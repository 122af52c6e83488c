use tracing::error;

/// bcrypt operates on at most 72 bytes of input. Longer passwords are
/// truncated, not rejected; hash and verify apply the same cut so long
/// passwords keep verifying consistently.
fn truncated(plain: &str) -> &[u8] {
    let bytes = plain.as_bytes();
    &bytes[..bytes.len().min(72)]
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    bcrypt::hash(truncated(plain), bcrypt::DEFAULT_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!(e.to_string())
    })
}

/// Returns false for a non-matching password or a malformed stored hash;
/// never errors.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(truncated(plain), hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn hashes_are_salted_per_call() {
        let password = "correct-horse-battery-staple";
        let first = hash_password(password).expect("hashing should succeed");
        let second = hash_password(password).expect("hashing should succeed");
        assert_ne!(first, second);
        assert!(verify_password(password, &first));
        assert!(verify_password(password, &second));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("right-password").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }

    #[test]
    fn input_beyond_72_bytes_is_ignored() {
        let prefix = "x".repeat(72);
        let long_a = format!("{prefix}aaaa");
        let long_b = format!("{prefix}bbbb");
        let hash = hash_password(&long_a).expect("hashing should succeed");
        // both share the first 72 bytes, so both verify
        assert!(verify_password(&long_b, &hash));
    }
}
