use super::{SyntaxError, ValidationMode};

const MAX_LOCAL_LEN: usize = 64;

/// RFC 5322 `atext` specials, plus '.' handled separately.
const ATEXT_SPECIALS: &[u8] = b"!#$%&'*+-/=?^_`{|}~";

pub(crate) fn check_local(local: &str, mode: ValidationMode) -> Result<(), SyntaxError> {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return Err(SyntaxError::LocalLength(local.len()));
    }

    let ok = match mode {
        ValidationMode::Strict => is_dot_atom(local),
        ValidationMode::Relaxed => is_quoted(local) || is_dot_atom(local),
    };
    if ok {
        Ok(())
    } else {
        Err(SyntaxError::LocalChars(mode))
    }
}

/// atext ASCII + '.' non initial/terminal, pas de ".."
fn is_dot_atom(s: &str) -> bool {
    if s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || ATEXT_SPECIALS.contains(&b))
}

/// RFC 5322 quoted-string: printable ASCII or space inside the quotes, `"`
/// and `\\` only as a quoted-pair. No control characters.
fn is_quoted(s: &str) -> bool {
    let Some(inner) = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };
    let mut bytes = inner.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\\' => match bytes.next() {
                Some(escaped) if escaped == b' ' || escaped.is_ascii_graphic() => {}
                _ => return false,
            },
            b'"' => return false,
            b' ' => {}
            b if b.is_ascii_graphic() => {}
            _ => return false,
        }
    }
    true
}
