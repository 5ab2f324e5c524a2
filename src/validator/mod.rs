//! Address syntax checks. Pure functions, no network access.

mod domain;
mod local;
mod types;

pub use types::{ParsedAddress, SyntaxError, ValidationMode};

use domain::check_domain;
use local::check_local;

/// RFC 5321: 254 octets max including the '@'.
const MAX_ADDRESS_LEN: usize = 254;

/// Checks `address` and splits it into local part and domain.
///
/// Surrounding whitespace is ignored. The error names the first rule the
/// address breaks.
pub fn validate_address(address: &str, mode: ValidationMode) -> Result<ParsedAddress, SyntaxError> {
    let input = address.trim();
    if input.is_empty() {
        return Err(SyntaxError::Empty);
    }
    if input.len() > MAX_ADDRESS_LEN {
        return Err(SyntaxError::TooLong(input.len()));
    }

    let (local, domain) = match input.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => (local, domain),
        _ => return Err(SyntaxError::AtSign),
    };

    check_local(local, mode)?;
    let ascii_domain = check_domain(domain)?;

    Ok(ParsedAddress {
        address: input.to_string(),
        local: local.to_string(),
        domain: domain.to_lowercase(),
        ascii_domain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_basic() {
        let parsed = validate_address("  alice@Example.com ", ValidationMode::Strict)
            .expect("valid address");
        assert_eq!(parsed.address, "alice@Example.com");
        assert_eq!(parsed.local, "alice");
        assert_eq!(parsed.domain, "example.com");
        assert_eq!(parsed.ascii_domain, "example.com");
    }

    #[test]
    fn rejects_double_at() {
        let err = validate_address("a@@b.com", ValidationMode::Strict).expect_err("two '@'");
        assert_eq!(err, SyntaxError::AtSign);
    }

    #[test]
    fn rejects_missing_at() {
        let err = validate_address("not-an-email", ValidationMode::Strict).expect_err("no '@'");
        assert_eq!(err.to_string(), "must contain exactly one '@'");
    }

    #[test]
    fn rejects_blank_and_too_long() {
        assert_eq!(
            validate_address("   ", ValidationMode::Strict),
            Err(SyntaxError::Empty)
        );
        let long = format!("{}@{}.com", "a".repeat(60), "b".repeat(200));
        assert!(matches!(
            validate_address(&long, ValidationMode::Strict),
            Err(SyntaxError::TooLong(_))
        ));
    }

    #[test]
    fn ascii_domain_for_unicode() {
        let parsed =
            validate_address("alice@exämple.com", ValidationMode::Strict).expect("idna domain");
        assert_eq!(parsed.domain, "exämple.com");
        assert!(parsed.ascii_domain.starts_with("xn--"));
    }

    proptest! {
        #[test]
        fn strings_without_at_never_validate(s in "[^@]{0,80}") {
            prop_assert!(validate_address(&s, ValidationMode::Relaxed).is_err());
        }

        #[test]
        fn simple_addresses_validate(local in "[a-z0-9]{1,20}", host in "[a-z0-9]{1,20}") {
            let address = format!("{local}@{host}.com");
            let parsed = validate_address(&address, ValidationMode::Strict);
            prop_assert!(parsed.is_ok(), "{:?}", parsed);
        }
    }
}
