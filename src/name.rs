//! Service name canonicalization.

use std::borrow::Cow;

/// Returns `token` in fully-qualified form, appending the root label
/// separator when it is missing. Case and inner structure are left alone.
pub fn normalize(token: &str) -> Cow<'_, str> {
    if token.ends_with('.') {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(format!("{}.", token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_missing_dot() {
        assert_eq!(normalize("_abc._tcp.domain"), "_abc._tcp.domain.");
    }

    #[test]
    fn keeps_fqdn_borrowed() {
        assert!(matches!(normalize("svc.example."), Cow::Borrowed("svc.example.")));
    }

    #[test]
    fn idempotent() {
        for token in ["svc", "svc.", "Svc.Example", "a.b.c.", "", "."] {
            let once = normalize(token).into_owned();
            assert_eq!(normalize(&once), once.as_str());
        }
    }

    #[test]
    fn preserves_case() {
        assert_eq!(normalize("MyService.Example"), "MyService.Example.");
    }
}
