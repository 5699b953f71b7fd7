//! Entry name normalization
//!
//! Every entry name is an absolute, `/`-rooted path. Normalization is purely
//! lexical and never consults the host filesystem.

/// Normalize `path` into an absolute entry name
///
/// The result starts with `/`, has no empty or `.` components and no trailing
/// slash (except for the root itself). A `..` component removes the previous
/// one and stops at the root.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for part in &parts {
        normalized.push('/');
        normalized.push_str(part);
    }

    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Join `prefix` and `relative` and normalize the result
pub fn join(prefix: &str, relative: &str) -> String {
    normalize(&format!("{prefix}/{relative}"))
}
