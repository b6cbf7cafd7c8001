//! URL slicing utilities for pattern derivation
//!
//! These functions avoid allocations and work directly on string slices.
//! They are deliberately looser than a full URL parser: the deriver only
//! needs the scheme word and the host component, and must tolerate the
//! sloppy `scheme:///host` form some browsers produce for file-ish URLs.

// =============================================================================
// Scheme Extraction
// =============================================================================

/// Extract the scheme word of a URL (the part before the first `:`).
/// Returns None unless the scheme is a non-empty ASCII-alphabetic run
/// immediately followed by `:`.
#[inline]
pub fn scheme_of(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    if colon == 0 {
        return None;
    }
    let scheme = &url[..colon];
    if scheme.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(scheme)
    } else {
        None
    }
}

/// Get the position after `://`, tolerating one extra slash
/// (`scheme:///host`). Returns None when the URL has no authority part.
#[inline]
pub fn authority_start(url: &str) -> Option<usize> {
    let scheme = scheme_of(url)?;
    let rest = &url[scheme.len()..];
    let rest = rest.strip_prefix("://")?;
    let mut start = scheme.len() + 3;
    if rest.starts_with('/') {
        start += 1;
    }
    Some(start)
}

// =============================================================================
// Host Extraction
// =============================================================================

/// Host end delimiters: path, query, fragment, port, whitespace.
#[inline]
fn is_host_end(b: u8) -> bool {
    matches!(b, b'/' | b'?' | b'#' | b':') || b.is_ascii_whitespace()
}

/// Extract the host component of a URL as a slice into the input.
/// Returns None for URLs without an authority or with an empty host.
#[inline]
pub fn host_of(url: &str) -> Option<&str> {
    let start = authority_start(url)?;
    let bytes = url.as_bytes();

    let mut end = bytes.len();
    for (i, &b) in bytes[start..].iter().enumerate() {
        if is_host_end(b) {
            end = start + i;
            break;
        }
    }

    if end == start {
        return None;
    }
    Some(&url[start..end])
}

/// Extract the path component (everything from the first `/` after the
/// host up to `?` or `#`). URLs without a path yield `/`.
#[inline]
pub fn path_of(url: &str) -> &str {
    let start = match authority_start(url) {
        Some(pos) => pos,
        None => return "/",
    };
    let bytes = url.as_bytes();

    let mut path_start = None;
    for (i, &b) in bytes[start..].iter().enumerate() {
        if b == b'/' {
            path_start = Some(start + i);
            break;
        }
        if b == b'?' || b == b'#' {
            return "/";
        }
    }

    let path_start = match path_start {
        Some(pos) => pos,
        None => return "/",
    };

    let mut path_end = bytes.len();
    for (i, &b) in bytes[path_start..].iter().enumerate() {
        if b == b'?' || b == b'#' {
            path_end = path_start + i;
            break;
        }
    }

    &url[path_start..path_end]
}
