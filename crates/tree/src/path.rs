//! Path splitting and lexical helpers.
//!
//! These are pure functions; every lookup and mutation in the tree is
//! defined in terms of the segment list produced here.

/// Splits an absolute or relative path into its segments.
///
/// Leading and trailing separators are dropped; adjacent separators in the
/// interior produce literal empty segments (`a//b` is three segments).
/// `split("/")` and `split("")` are both empty.
pub fn split(path: &str) -> Vec<&str> {
	let trimmed = path.trim_matches('/');
	if trimmed.is_empty() {
		return Vec::new();
	}
	trimmed.split('/').collect()
}

/// Returns the parent path, or `None` for the root and for relative paths.
pub fn parent(path: &str) -> Option<&str> {
	if path == "/" {
		return None;
	}
	match path.rfind('/')? {
		0 => Some("/"),
		idx => Some(&path[..idx]),
	}
}

/// Returns the last segment of the path.
pub fn name(path: &str) -> &str {
	path.rsplit('/').next().unwrap_or(path)
}
