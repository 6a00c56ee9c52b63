//! IRI namespace utilities.
//!
//! Centralizes the namespace/local split rule and the prefixed-name
//! (CURIE) encoding so the allocator, directory, and ingestion paths all
//! agree on where an IRI divides.

use crate::error::{Error, Result};

/// Split an IRI into `(namespace, local)` parts.
///
/// The split point is just after the last `/` or `#`; IRIs with neither
/// separator split into an empty namespace and the whole input as the
/// local part.
///
/// # Examples
///
/// ```
/// use tessera_core::split_iri;
/// assert_eq!(split_iri("http://example.org/ns#Person"), ("http://example.org/ns#", "Person"));
/// assert_eq!(split_iri("http://example.org/Person"), ("http://example.org/", "Person"));
/// assert_eq!(split_iri("Person"), ("", "Person"));
/// ```
pub fn split_iri(iri: &str) -> (&str, &str) {
    match iri.rfind(['/', '#']) {
        Some(pos) => (&iri[..=pos], &iri[pos + 1..]),
        None => ("", iri),
    }
}

/// Recognize a caller-supplied bare prefix token.
///
/// A bare prefix is a short token (`[A-Za-z][A-Za-z0-9_.-]*`) with an
/// optional trailing `:`, as opposed to a full namespace IRI. Returns
/// the token with the trailing separator stripped, or `None` when the
/// input must be treated as an IRI.
///
/// # Examples
///
/// ```
/// use tessera_core::bare_prefix;
/// assert_eq!(bare_prefix("ex:"), Some("ex"));
/// assert_eq!(bare_prefix("ex"), Some("ex"));
/// assert_eq!(bare_prefix("http://example.org/"), None);
/// assert_eq!(bare_prefix("urn:uuid:"), None);
/// ```
pub fn bare_prefix(input: &str) -> Option<&str> {
    let token = input.strip_suffix(':').unwrap_or(input);
    let mut chars = token.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        Some(token)
    } else {
        None
    }
}

/// Join a prefix and local name into a prefixed name (`prefix:local`).
pub fn join_prefixed(prefix: &str, local: &str) -> String {
    format!("{}:{}", prefix, local)
}

/// Split a prefixed name into `(prefix, local)`.
///
/// The split is at the first `:`; both parts must be non-empty on the
/// prefix side (an empty local name is legal — namespaces can denote a
/// resource themselves).
pub fn split_prefixed(name: &str) -> Result<(&str, &str)> {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() => Ok((prefix, local)),
        _ => Err(Error::invalid_prefixed_name(name)),
    }
}

/// Expand a prefixed name back to a full IRI using a prefix resolver.
///
/// The resolver maps a prefix to its namespace IRI; unknown prefixes
/// fail with `Error::UnknownPrefix`.
pub fn expand_prefixed<'a>(
    name: &str,
    resolve: impl Fn(&str) -> Option<&'a str>,
) -> Result<String> {
    let (prefix, local) = split_prefixed(name)?;
    let namespace = resolve(prefix).ok_or_else(|| Error::unknown_prefix(prefix))?;
    Ok(format!("{}{}", namespace, local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_iri_hash() {
        let (ns, local) = split_iri("http://example.org/ns1#knows");
        assert_eq!(ns, "http://example.org/ns1#");
        assert_eq!(local, "knows");
    }

    #[test]
    fn test_split_iri_slash() {
        let (ns, local) = split_iri("http://xmlns.com/foaf/0.1/name");
        assert_eq!(ns, "http://xmlns.com/foaf/0.1/");
        assert_eq!(local, "name");
    }

    #[test]
    fn test_split_iri_no_separator() {
        assert_eq!(split_iri("Person"), ("", "Person"));
    }

    #[test]
    fn test_split_iri_trailing_separator() {
        // IRI that *is* a namespace: empty local part
        assert_eq!(
            split_iri("http://example.org/ns#"),
            ("http://example.org/ns#", "")
        );
    }

    #[test]
    fn test_bare_prefix() {
        assert_eq!(bare_prefix("ex:"), Some("ex"));
        assert_eq!(bare_prefix("ex"), Some("ex"));
        assert_eq!(bare_prefix("foaf-v0.1:"), Some("foaf-v0.1"));
        assert_eq!(bare_prefix("http://example.org/"), None);
        assert_eq!(bare_prefix("urn:uuid:"), None);
        assert_eq!(bare_prefix("_blank"), None);
        assert_eq!(bare_prefix(""), None);
        assert_eq!(bare_prefix(":"), None);
    }

    #[test]
    fn test_prefixed_round_trip() {
        let name = join_prefixed("ns1", "knows");
        assert_eq!(name, "ns1:knows");
        assert_eq!(split_prefixed(&name).unwrap(), ("ns1", "knows"));
    }

    #[test]
    fn test_split_prefixed_rejects_missing_prefix() {
        assert!(split_prefixed("noprefix").is_err());
        assert!(split_prefixed(":local").is_err());
    }

    #[test]
    fn test_split_prefixed_empty_local() {
        assert_eq!(split_prefixed("ns1:").unwrap(), ("ns1", ""));
    }

    #[test]
    fn test_expand_prefixed() {
        let resolve = |p: &str| (p == "ex").then_some("http://example.org/");
        assert_eq!(
            expand_prefixed("ex:a", resolve).unwrap(),
            "http://example.org/a"
        );
        assert!(matches!(
            expand_prefixed("zz:a", resolve),
            Err(Error::UnknownPrefix(_))
        ));
    }
}
