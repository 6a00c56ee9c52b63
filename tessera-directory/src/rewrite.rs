//! Storage URL parsing and database-name rewriting.
//!
//! Storage URLs follow the `tessera:<method>://<path>[?query]` family.
//! Each method has its own path grammar; rewriting replaces only the
//! database-name segment and preserves any trailing query parameters
//! verbatim. Deriving a sibling URL for the same name twice, or
//! rewriting an already rewritten URL, is byte-stable.

use crate::error::{DirectoryError, Result};

/// URL scheme tag ahead of the storage method
const SCHEME: &str = "tessera:";

/// Parsed components of a storage URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStoreUrl<'a> {
    /// Storage method (e.g., "mem", "ddb", "sql")
    pub method: &'a str,
    /// Path portion after `://`, with the query stripped
    pub path: &'a str,
    /// Query portion after `?`, if any
    pub query: Option<&'a str>,
}

/// Parse a storage URL into method, path, and query.
///
/// Fails with `UnrecognizedScheme` when the URL does not carry the
/// `tessera:<method>://` shape.
pub fn parse_store_url(url: &str) -> Result<ParsedStoreUrl<'_>> {
    let rest = url
        .strip_prefix(SCHEME)
        .ok_or_else(|| DirectoryError::unrecognized_scheme(url))?;
    let sep = rest
        .find("://")
        .ok_or_else(|| DirectoryError::unrecognized_scheme(url))?;
    let method = &rest[..sep];
    let full_path = &rest[sep + 3..];
    if method.is_empty() || full_path.is_empty() {
        return Err(DirectoryError::unrecognized_scheme(url));
    }
    let (path, query) = match full_path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (full_path, None),
    };
    Ok(ParsedStoreUrl {
        method,
        path,
        query,
    })
}

/// Rewrite a storage URL to point at a sibling database.
///
/// Everything but the database-name segment is preserved, including the
/// query tail. Unknown methods and paths that do not fit the method's
/// grammar fail with `UnrecognizedScheme` — fatal to the caller, never
/// retried.
pub fn rewrite_store_url(url: &str, db_name: &str) -> Result<String> {
    let parsed = parse_store_url(url)?;
    let path = match parsed.method {
        // tessera:mem://{name} | tessera:sql://{name}?{jdbc-params}
        "mem" | "sql" => {
            if parsed.path.contains('/') {
                return Err(DirectoryError::unrecognized_scheme(url));
            }
            db_name.to_string()
        }
        // tessera:ddb://{region}/{table}/{name}
        "ddb" => {
            let segments: Vec<&str> = parsed.path.split('/').collect();
            let [region, table, _name] = segments.as_slice() else {
                return Err(DirectoryError::unrecognized_scheme(url));
            };
            format!("{}/{}/{}", region, table, db_name)
        }
        // tessera:file://{dir...}/{name} | tessera:peer://{host}:{port}/{name}
        "file" | "peer" => match parsed.path.rsplit_once('/') {
            Some((routing, _name)) => format!("{}/{}", routing, db_name),
            None if parsed.method == "file" => db_name.to_string(),
            None => return Err(DirectoryError::unrecognized_scheme(url)),
        },
        _ => return Err(DirectoryError::unrecognized_scheme(url)),
    };
    Ok(match parsed.query {
        Some(query) => format!("{}{}://{}?{}", SCHEME, parsed.method, path, query),
        None => format!("{}{}://{}", SCHEME, parsed.method, path),
    })
}

/// Extract the database-name segment of a storage URL.
pub fn store_db_name(url: &str) -> Result<String> {
    let parsed = parse_store_url(url)?;
    match parsed.method {
        "mem" | "sql" => Ok(parsed.path.to_string()),
        "ddb" | "file" | "peer" => Ok(parsed
            .path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(parsed.path)
            .to_string()),
        _ => Err(DirectoryError::unrecognized_scheme(url)),
    }
}
