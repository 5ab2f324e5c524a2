use super::SyntaxError;

const MAX_LABEL_LEN: usize = 63;

/// Converts the domain to its IDNA ASCII form and checks every label.
/// Returns the ASCII domain on success.
pub(crate) fn check_domain(domain: &str) -> Result<String, SyntaxError> {
    if domain.is_empty() {
        return Err(SyntaxError::EmptyDomain);
    }
    let ascii = idna::domain_to_ascii(domain).map_err(|_| SyntaxError::Idna)?;
    if ascii.is_empty() {
        return Err(SyntaxError::EmptyDomain);
    }
    if !ascii.contains('.') {
        return Err(SyntaxError::NoDot);
    }

    for label in ascii.split('.') {
        if label.is_empty() {
            return Err(SyntaxError::EmptyLabel);
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(SyntaxError::LabelTooLong {
                label: label.to_string(),
                len: label.len(),
            });
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(SyntaxError::LabelHyphen(label.to_string()));
        }
        if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(SyntaxError::LabelChars(label.to_string()));
        }
    }
    Ok(ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_domain_ok() {
        assert_eq!(check_domain("Example.COM").as_deref(), Ok("example.com"));
    }

    #[test]
    fn unicode_domain_is_punycoded() {
        let ascii = check_domain("exämple.com").expect("idna");
        assert!(ascii.starts_with("xn--"), "{ascii}");
    }

    #[test]
    fn label_too_long() {
        let long = "a".repeat(64);
        let err = check_domain(&format!("{long}.com")).expect_err("too long");
        assert!(matches!(err, SyntaxError::LabelTooLong { len: 64, .. }));
    }

    #[test]
    fn rejects_dotless_and_empty_labels() {
        assert_eq!(check_domain("localhost"), Err(SyntaxError::NoDot));
        assert!(check_domain("a..com").is_err());
        assert_eq!(
            check_domain("-bad.com"),
            Err(SyntaxError::LabelHyphen("-bad".to_string()))
        );
    }
}
