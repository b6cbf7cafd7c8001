//! Rule pattern derivation and matching
//!
//! `derive` turns an arbitrary page URL into the canonical match pattern a
//! rule should be installed under. `pattern_matches` answers the inverse
//! question (does a concrete URL fall under a given pattern), which the
//! authoritative store resolves internally but fakes and the CLI need to
//! answer themselves.

use crate::url::{host_of, path_of, scheme_of};

// =============================================================================
// Derivation
// =============================================================================

/// Derive the rule pattern for a page URL.
///
/// - internal settings pages (`chrome:`) have no derivable pattern;
/// - local files are matched exactly, the URL itself is the pattern;
/// - anything with an extractable host becomes `*://*.<host>/*`.
///   IP-literal hosts use the same wildcard template as DNS hosts
///   (the older `*://<ip>/*` form is retired);
/// - URLs without a host have no pattern.
pub fn derive(url: &str) -> Option<String> {
    match scheme_of(url) {
        Some("chrome") => return None,
        Some("file") => return Some(url.to_string()),
        _ => {}
    }
    let host = host_of(url)?;
    Some(format!("*://*.{host}/*"))
}

// =============================================================================
// Matching
// =============================================================================

/// Check whether `url` falls under `pattern`.
///
/// Supports the shapes `derive` emits plus plain chrome-style patterns:
/// `<scheme|*>://[*.]host<path-glob>`. A `*.host` component matches the
/// host itself and any subdomain. `file:` patterns compare exactly.
pub fn pattern_matches(pattern: &str, url: &str) -> bool {
    if pattern.starts_with("file:") {
        return pattern == url;
    }

    let sep = match pattern.find("://") {
        Some(sep) => sep,
        None => return false,
    };
    let scheme_pat = &pattern[..sep];
    let rest = &pattern[sep + 3..];
    let (host_pat, path_pat) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    if host_pat.is_empty() {
        return false;
    }

    let scheme = match scheme_of(url) {
        Some(s) => s,
        None => return false,
    };
    // Internal and local-file URLs never fall under wildcard patterns
    if scheme == "chrome" || scheme == "file" {
        return false;
    }
    let host = match host_of(url) {
        Some(h) => h,
        None => return false,
    };

    scheme_matches(scheme_pat, scheme)
        && host_matches(host_pat, host)
        && glob_matches(path_pat, path_of(url))
}

/// Relative specificity of a pattern, used to pick the winning rule when
/// several match the same URL: longer host components are more specific.
/// Exact `file:` patterns outrank any wildcard.
pub fn specificity(pattern: &str) -> usize {
    if pattern.starts_with("file:") {
        return usize::MAX;
    }
    match pattern.find("://") {
        Some(sep) => {
            let rest = &pattern[sep + 3..];
            let host = rest.split('/').next().unwrap_or("");
            host.trim_start_matches("*.").len()
        }
        None => 0,
    }
}

#[inline]
fn scheme_matches(pat: &str, scheme: &str) -> bool {
    pat == "*" || pat.eq_ignore_ascii_case(scheme)
}

fn host_matches(pat: &str, host: &str) -> bool {
    if pat == "*" {
        return true;
    }
    if let Some(base) = pat.strip_prefix("*.") {
        return host.eq_ignore_ascii_case(base) || ends_with_domain(host, base);
    }
    pat.eq_ignore_ascii_case(host)
}

#[inline]
fn ends_with_domain(host: &str, base: &str) -> bool {
    host.len() > base.len() + 1
        && host.as_bytes()[host.len() - base.len() - 1] == b'.'
        && host[host.len() - base.len()..].eq_ignore_ascii_case(base)
}

/// Iterative `*` glob over bytes, no allocation.
fn glob_matches(pat: &str, text: &str) -> bool {
    let p = pat.as_bytes();
    let t = text.as_bytes();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;

    while ti < t.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_internal_scheme() {
        assert_eq!(derive("chrome://settings"), None);
        assert_eq!(derive("chrome://settings/content/javascript"), None);
    }

    #[test]
    fn test_derive_file_scheme_is_exact() {
        let url = "file:///home/user/page.html";
        assert_eq!(derive(url).as_deref(), Some(url));
    }

    #[test]
    fn test_derive_host_wildcard() {
        assert_eq!(
            derive("https://sub.example.com/path?q=1").as_deref(),
            Some("*://*.sub.example.com/*")
        );
        assert_eq!(
            derive("http://example.com").as_deref(),
            Some("*://*.example.com/*")
        );
    }

    #[test]
    fn test_derive_ip_host_uses_unified_template() {
        // IP literals fold into the same wildcard shape as DNS hosts
        assert_eq!(
            derive("http://127.0.0.1/index.html").as_deref(),
            Some("*://*.127.0.0.1/*")
        );
        assert_eq!(
            derive("http://192.168.0.1:8080/").as_deref(),
            Some("*://*.192.168.0.1/*")
        );
    }

    #[test]
    fn test_derive_no_host() {
        assert_eq!(derive("mailto:user@example.com"), None);
        assert_eq!(derive("not a url"), None);
        assert_eq!(derive("https://"), None);
    }

    #[test]
    fn test_pattern_matches_wildcard_host() {
        let pat = "*://*.example.com/*";
        assert!(pattern_matches(pat, "https://example.com/"));
        assert!(pattern_matches(pat, "https://sub.example.com/a/b?q=1"));
        assert!(pattern_matches(pat, "http://deep.sub.example.com"));
        assert!(!pattern_matches(pat, "https://notexample.com/"));
        assert!(!pattern_matches(pat, "https://example.org/"));
    }

    #[test]
    fn test_pattern_matches_exact_file() {
        let pat = "file:///tmp/a.html";
        assert!(pattern_matches(pat, "file:///tmp/a.html"));
        assert!(!pattern_matches(pat, "file:///tmp/b.html"));
        assert!(!pattern_matches("*://*.example.com/*", "file:///tmp/a.html"));
    }

    #[test]
    fn test_pattern_never_matches_internal() {
        assert!(!pattern_matches("*://*.settings/*", "chrome://settings"));
    }

    #[test]
    fn test_path_glob() {
        assert!(pattern_matches("*://*.example.com/ads/*", "https://example.com/ads/x.js"));
        assert!(!pattern_matches("*://*.example.com/ads/*", "https://example.com/news"));
        assert!(pattern_matches("https://example.com/", "https://example.com"));
    }

    #[test]
    fn test_specificity_orders_hosts() {
        assert!(specificity("*://*.sub.example.com/*") > specificity("*://*.example.com/*"));
        assert_eq!(specificity("file:///tmp/a.html"), usize::MAX);
    }
}
