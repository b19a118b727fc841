//! `Vary` header merging.

/// Merge `field` into an existing `Vary` value.
///
/// Returns `None` when the existing value already lists `field` (compared
/// case-insensitively) or is the catch-all `*`, in which case the header must
/// be left untouched. Otherwise returns the new, comma-joined value.
pub(crate) fn merge(existing: Option<&str>, field: &str) -> Option<String> {
    let existing = existing.map(str::trim).filter(|v| !v.is_empty());
    match existing {
        None => Some(field.to_string()),
        Some(value) => {
            let listed = value.split(',').map(str::trim);
            for entry in listed {
                if entry == "*" || entry.eq_ignore_ascii_case(field) {
                    return None;
                }
            }
            Some(format!("{value}, {field}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::merge;

    #[test]
    fn test_merge_into_empty() {
        assert_eq!(merge(None, "Origin").as_deref(), Some("Origin"));
        assert_eq!(merge(Some("  "), "Origin").as_deref(), Some("Origin"));
    }

    #[test]
    fn test_merge_appends_in_order() {
        assert_eq!(
            merge(Some("Origin"), "Access-Control-Request-Method").as_deref(),
            Some("Origin, Access-Control-Request-Method")
        );
    }

    #[test]
    fn test_merge_skips_duplicates_case_insensitively() {
        assert_eq!(merge(Some("Accept-Encoding, origin"), "Origin"), None);
    }

    #[test]
    fn test_merge_leaves_wildcard_alone() {
        assert_eq!(merge(Some("*"), "Origin"), None);
    }
}
