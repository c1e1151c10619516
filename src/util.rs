/// Directory bucket of a repository path at `depth` components.
///
/// Depth 0 collapses everything into ".". Files with fewer directory
/// components than `depth` go to their parent directory, root-level files
/// to ".".
pub fn dir_prefix(path: &str, depth: usize) -> String {
    if depth == 0 {
        return ".".to_string();
    }
    let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    parts.pop(); // file name
    if parts.is_empty() {
        return ".".to_string();
    }
    parts.truncate(depth);
    parts.join("/")
}

/// Whether `path` lies under the directory `prefix` (component-wise, so
/// `src` does not match `srcfoo/x.rs`). An empty prefix or "." matches all.
pub fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() || prefix == "." {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// `part / total` as a percentage rounded to one decimal, 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 * 100.0 / total as f64)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[path = "util_test.rs"]
mod tests;
