//! Document path and url arithmetic
//!
//! Document paths are `/`-separated and relative to the source root, without
//! extension (`guide/install`). Output urls are relative to the output root
//! (`guide/install.html`) until made relative to the current document.

/// Whether a url carries a scheme (`https:`, `mailto:`) or is protocol-relative
pub fn is_external(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }

    match url.find(':') {
        Some(colon) if colon > 0 && !url[colon + 1..].starts_with(':') => {
            let scheme = &url[..colon];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Directory part of a document path, `""` at the root
pub fn dir_name(file: &str) -> &str {
    match file.rfind('/') {
        Some(slash) => &file[..slash],
        None => "",
    }
}

/// Resolve `url` against `dir` into a root-relative document path
///
/// A leading `/` anchors at the root. Returns an empty string when `..`
/// climbs above the root or nothing remains.
pub fn canonical_url(dir: &str, url: &str) -> String {
    if is_external(url) {
        return url.to_string();
    }

    let joined = if let Some(absolute) = url.strip_prefix('/') {
        absolute.to_string()
    } else if dir.is_empty() {
        url.to_string()
    } else {
        format!("{}/{}", dir, url)
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return String::new();
                }
            }
            segment => parts.push(segment),
        }
    }

    parts.join("/")
}

/// Express a root-relative url relative to the document directory `dir`
pub fn relative_url(dir: &str, url: &str) -> String {
    if is_external(url) || url.starts_with('#') || url.is_empty() {
        return url.to_string();
    }

    let dir_parts: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    let target_parts: Vec<&str> = url.trim_start_matches('/').split('/').collect();
    let (target_dirs, file) = target_parts.split_at(target_parts.len().saturating_sub(1));

    let common = dir_parts
        .iter()
        .zip(target_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; dir_parts.len() - common];
    parts.extend_from_slice(&target_dirs[common..]);
    parts.extend_from_slice(file);
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_external() {
        assert!(is_external("https://php.net"));
        assert!(is_external("mailto:a@b.c"));
        assert!(is_external("//cdn.example.com/x.js"));
        assert!(!is_external("guide/install"));
        assert!(!is_external("Foo::bar()"));
        assert!(!is_external("#anchor"));
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(canonical_url("guide", "install"), "guide/install");
        assert_eq!(canonical_url("guide", "../index"), "index");
        assert_eq!(canonical_url("guide", "/reference/api"), "reference/api");
        assert_eq!(canonical_url("", "./a/./b"), "a/b");
        assert_eq!(canonical_url("", "../outside"), "");
        assert_eq!(canonical_url("guide", ""), "guide");
        assert_eq!(canonical_url("", ""), "");
    }

    #[test]
    fn test_relative_url() {
        assert_eq!(relative_url("", "guide/install.html"), "guide/install.html");
        assert_eq!(relative_url("guide", "guide/install.html"), "install.html");
        assert_eq!(relative_url("guide/deep", "classes/Foo.html#method_x"), "../../classes/Foo.html#method_x");
        assert_eq!(relative_url("guide", "https://php.net"), "https://php.net");
        assert_eq!(relative_url("guide", "#top"), "#top");
    }

    #[test]
    fn test_dir_name() {
        assert_eq!(dir_name("guide/install"), "guide");
        assert_eq!(dir_name("index"), "");
    }
}
