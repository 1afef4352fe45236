//! Identifier validation for table and column names.
//!
//! Names end up formatted into DDL, so anything that is not a plain
//! identifier is refused before it reaches a backend.

use std::sync::LazyLock;

use regex::Regex;

use crate::SchemaError;

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").unwrap());

/// Checks that `name` is a bare SQL identifier.
///
/// # Errors
/// Returns [`SchemaError::InvalidIdentifier`] otherwise.
pub fn validate_identifier(name: &str) -> Result<(), SchemaError> {
    if IDENTIFIER_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_identifier("sentry_organizationmember").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("col2").is_ok());
    }

    #[test]
    fn rejects_injection_and_empty() {
        for bad in ["", "2col", "a b", "counter; DROP TABLE x", "t\"", "naïve"] {
            assert_eq!(
                validate_identifier(bad),
                Err(SchemaError::InvalidIdentifier(bad.to_owned())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overlong() {
        let long = "a".repeat(64);
        assert!(validate_identifier(&long).is_err());
        assert!(validate_identifier(&long[..63]).is_ok());
    }
}
