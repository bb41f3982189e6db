//! Canonical URL keys used by the frontier and the inspectors.

/// Strip every trailing slash so `https://a/b/`, `https://a/b//` and
/// `https://a/b` share one key.
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_slash() {
        assert_eq!(normalize_url("https://a/b/"), "https://a/b");
        assert_eq!(normalize_url("https://a/b"), "https://a/b");
    }

    #[test]
    fn test_normalize_strips_repeated_trailing_slashes() {
        assert_eq!(normalize_url("https://a/b//"), "https://a/b");
        assert_eq!(normalize_url("https://a/b///"), "https://a/b");
    }

    #[test]
    fn test_normalize_trailing_slash_variants_share_key() {
        assert_eq!(normalize_url("https://a/b/"), normalize_url("https://a/b"));
        assert_eq!(normalize_url("https://a/b//"), normalize_url("https://a/b"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for u in [
            "https://example.com/",
            "https://example.com",
            "https://a/b/c/",
            "https://a/b//",
            "https://a/b///",
            "",
            "/",
            "//",
        ] {
            let once = normalize_url(u);
            assert_eq!(normalize_url(&once), once, "not idempotent for {:?}", u);
        }
    }

    #[test]
    fn test_normalize_root_url() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com");
    }
}
