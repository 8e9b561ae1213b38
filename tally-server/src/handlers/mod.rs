pub mod health;
pub mod jobs;
pub mod tokens;

/// Checks a caller-supplied trigger key against the configured one. When no
/// key is configured, the trigger surface is open and every request passes.
pub fn key_matches(correct_key: Option<&str>, provided_key: Option<&str>) -> bool {
    let Some(correct_key) = correct_key else {
        return true;
    };

    let Some(provided_key) = provided_key else {
        return false;
    };

    let correct_key = correct_key.as_bytes();
    let provided_key = provided_key.as_bytes();

    if correct_key.len() != provided_key.len() || provided_key.is_empty() {
        return false;
    }

    let mut keys_dont_match = 0u8;

    // Do bitwise comparison to prevent timing attacks
    for (i, correct_key_byte) in correct_key.iter().enumerate() {
        unsafe {
            keys_dont_match |= correct_key_byte ^ provided_key.get_unchecked(i);
        }
    }

    keys_dont_match == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches_open_when_unconfigured() {
        assert!(key_matches(None, None));
        assert!(key_matches(None, Some("anything")));
    }

    #[test]
    fn test_key_matches_requires_exact_key() {
        assert!(key_matches(Some("s3cret"), Some("s3cret")));
        assert!(!key_matches(Some("s3cret"), Some("s3cre")));
        assert!(!key_matches(Some("s3cret"), Some("s3cret ")));
        assert!(!key_matches(Some("s3cret"), Some("")));
        assert!(!key_matches(Some("s3cret"), None));
    }
}
