//! URL path normalization applied to resolved links
use crate::config::UrlOptions;

pub const DEFAULT_EXTENSION: &str = ".html";
const INDEX_PAGE: &str = "index";

/// Splits `"/a/b.html?x=1#top"` into `("/a/b.html", "?x=1#top")`
fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(idx) => (&url[..idx], &url[idx..]),
        None => (url, ""),
    }
}

pub fn strip_default_extension(path: &str) -> &str {
    path.strip_suffix(DEFAULT_EXTENSION).unwrap_or(path)
}

/// `/about/index` becomes `/about/`, `/index` becomes `/`
pub fn strip_index_path(path: &str) -> &str {
    match path.strip_suffix(INDEX_PAGE) {
        Some(dir) if dir.ends_with('/') => dir,
        _ => path,
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Applies the configured rewrite rules to a resolved URL.
///
/// Empty input stays empty: it is the "not resolved" signal downstream.
pub fn post_process_url(url: &str, options: UrlOptions) -> String {
    if url.is_empty() {
        return String::new();
    }

    let (mut path, suffix) = split_suffix(url);
    if options.remove_extension {
        path = strip_default_extension(path);
    }
    if options.strip_index_path {
        path = strip_index_path(path);
    }
    if !options.keep_trailing_slash {
        path = trim_trailing_slash(path);
    }

    format!("{path}{suffix}")
}
