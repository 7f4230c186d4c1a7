//! URI joining and key decomposition.
//!
//! Keys are `/`-separated; every function here is pure string manipulation.

const SEPARATOR: char = '/';

/// Join `base` and `tail` with exactly one `/` at the seam.
///
/// An empty (or all-separator) `tail` returns `base` unchanged.
///
/// ```
/// use webdav_store::path::join;
///
/// assert_eq!(join("http://h/webdav", "dir"), "http://h/webdav/dir");
/// assert_eq!(join("http://h/webdav/", "/dir"), "http://h/webdav/dir");
/// assert_eq!(join("http://h/webdav", ""), "http://h/webdav");
/// ```
pub fn join(base: &str, tail: &str) -> String {
    let tail = tail.trim_start_matches(SEPARATOR);
    if tail.is_empty() {
        return base.to_string();
    }

    let base = base.trim_end_matches(SEPARATOR);
    let mut joined = String::with_capacity(base.len() + tail.len() + 1);
    joined.push_str(base);
    joined.push(SEPARATOR);
    joined.push_str(tail);
    joined
}

/// Like [`join`], but an absent tail is treated as empty.
pub fn join_opt(base: &str, tail: Option<&str>) -> String {
    join(base, tail.unwrap_or_default())
}

/// Cumulative directory prefixes of `key`, shallowest first, leaf excluded.
///
/// Empty segments are skipped so a stray leading, trailing, or doubled `/`
/// never yields an empty directory name.
///
/// ```
/// use webdav_store::path::ancestor_segments;
///
/// assert_eq!(ancestor_segments("a/b/c.txt"), vec!["a", "a/b"]);
/// assert!(ancestor_segments("c.txt").is_empty());
/// ```
pub fn ancestor_segments(key: &str) -> Vec<String> {
    let segments = segments(key);
    match segments.split_last() {
        Some((_leaf, dirs)) => cumulative(dirs),
        None => Vec::new(),
    }
}

/// Every cumulative prefix of `path`, including the last segment.
///
/// Used for a directory path such as a configured prefix, where the final
/// segment is itself a collection.
pub fn directory_chain(path: &str) -> Vec<String> {
    cumulative(&segments(path))
}

fn segments(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

fn cumulative(segments: &[&str]) -> Vec<String> {
    segments
        .iter()
        .scan(String::new(), |acc, segment| {
            if !acc.is_empty() {
                acc.push(SEPARATOR);
            }
            acc.push_str(segment);
            Some(acc.clone())
        })
        .collect()
}

/// Absolute URI of `key` under `base` and an optional `prefix`.
pub fn resolve(base: &str, prefix: Option<&str>, key: &str) -> String {
    join(&join_opt(base, prefix), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_every_seam() {
        assert_eq!(join("http://h", "a"), "http://h/a");
        assert_eq!(join("http://h/", "a"), "http://h/a");
        assert_eq!(join("http://h", "/a"), "http://h/a");
        assert_eq!(join("http://h/", "/a"), "http://h/a");
        assert_eq!(join("http://h//", "//a/b"), "http://h/a/b");
    }

    #[test]
    fn join_with_empty_tail_is_identity() {
        assert_eq!(join("http://h/webdav/", ""), "http://h/webdav/");
        assert_eq!(join("http://h/webdav", "/"), "http://h/webdav");
        assert_eq!(join_opt("http://h/webdav", None), "http://h/webdav");
    }

    #[test]
    fn ancestors_of_nested_key() {
        assert_eq!(
            ancestor_segments("a/b/c/d.txt"),
            vec!["a".to_string(), "a/b".to_string(), "a/b/c".to_string()]
        );
    }

    #[test]
    fn ancestors_of_flat_key() {
        assert!(ancestor_segments("file.pdf").is_empty());
        assert!(ancestor_segments("").is_empty());
    }

    #[test]
    fn ancestors_ignore_empty_segments() {
        assert_eq!(ancestor_segments("/a//b/c.txt"), vec!["a", "a/b"]);
    }

    #[test]
    fn directory_chain_includes_last_segment() {
        assert_eq!(directory_chain("p/cache"), vec!["p", "p/cache"]);
        assert_eq!(directory_chain("p/cache/"), vec!["p", "p/cache"]);
        assert_eq!(directory_chain("p"), vec!["p"]);
        assert!(directory_chain("").is_empty());
        assert!(directory_chain("/").is_empty());
    }

    #[test]
    fn resolve_with_and_without_prefix() {
        assert_eq!(
            resolve("http://h/webdav", None, "dir/file.pdf"),
            "http://h/webdav/dir/file.pdf"
        );
        assert_eq!(
            resolve("http://h/webdav", Some("p/cache"), "dir/file.pdf"),
            "http://h/webdav/p/cache/dir/file.pdf"
        );
        assert_eq!(
            resolve("http://h/webdav/", Some(""), "file.pdf"),
            "http://h/webdav/file.pdf"
        );
    }

    #[test]
    fn resolve_never_doubles_separator() {
        let uri = resolve("http://h/webdav/", Some("/p/"), "/dir/file.pdf");
        assert_eq!(uri, "http://h/webdav/p/dir/file.pdf");
    }
}
