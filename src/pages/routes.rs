//! Route derivation and title helpers.
//!
//! Routes carry a single leading slash and no trailing slash except the root
//! route itself. A file named `index` maps to its containing directory's
//! route; the root `index` maps to `/`.

/// Derive the route for a repository-relative markdown file path.
pub fn route_for_file(rel_path: &str) -> String {
    let mut route = rel_path.strip_suffix(".md").unwrap_or(rel_path);
    if route == "index" {
        route = "";
    } else if let Some(stripped) = route.strip_suffix("/index") {
        route = stripped;
    }
    if route.is_empty() {
        "/".to_string()
    } else {
        format!("/{route}")
    }
}

/// Normalize a route string: single leading slash, trailing slash removed
/// except for the root route. `/a/b/` and `/a/b` identify the same document.
pub fn normalize_route(route: &str) -> String {
    let trimmed = route.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Route of the parent directory: the route with its last path segment
/// removed. The root route has no parent.
pub fn parent_route(route: &str) -> Option<String> {
    if route == "/" {
        return None;
    }
    let idx = route.rfind('/')?;
    if idx == 0 {
        Some("/".to_string())
    } else {
        Some(route[..idx].to_string())
    }
}

/// Uppercase the first letter of every word, leaving other characters alone.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_word = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() && !prev_is_word {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_is_word = ch.is_alphanumeric() || ch == '_';
    }
    out
}

/// Human-readable title for a route's last path segment: underscores become
/// spaces and each word is capitalized. The root route titles as "Home".
pub fn title_for_route_segment(route: &str) -> String {
    if route == "/" {
        return "Home".to_string();
    }
    let segment = route.rsplit('/').find(|s| !s.is_empty()).unwrap_or(route);
    capitalize_words(&segment.replace('_', " "))
}
