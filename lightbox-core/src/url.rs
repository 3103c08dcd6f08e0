//! Page-relative URLs for the viewer assets.

/// Output path of the viewer stylesheet, relative to the site root.
pub const STYLESHEET_PATH: &str = "assets/stylesheets/lightbox.min.css";

/// Output path of the viewer script, relative to the site root.
pub const SCRIPT_PATH: &str = "assets/javascripts/lightbox.min.js";

/// Normalize a page URL to be relative to the site root.
///
/// Strips a leading `/` and, for sites served from a sub-path, the
/// `base_path` prefix.
#[must_use]
pub fn site_relative(url: &str, base_path: &str) -> String {
  let url = url.trim_start_matches('/');
  if base_path.is_empty() {
    return url.to_string();
  }

  match url.strip_prefix(base_path) {
    Some("") => String::new(),
    Some(rest) if rest.starts_with('/') => {
      rest.trim_start_matches('/').to_string()
    },
    _ => url.to_string(),
  }
}

/// Directory a page URL resolves relative links against.
///
/// Directory URLs (`guide/`) are their own directory. A last segment with a
/// `.` is a file and is dropped (`guide/setup.html` gives `guide`).
fn page_directory(page_url: &str) -> Vec<&str> {
  let (parent, last) = page_url.rsplit_once('/').unwrap_or(("", page_url));
  let directory = if last.contains('.') { parent } else { page_url };

  directory
    .split('/')
    .filter(|segment| !segment.is_empty() && *segment != ".")
    .collect()
}

/// Path of the site-relative `target` as seen from the page at `page_url`.
///
/// Root pages get `target` itself, pages one directory down get
/// `../target`, and so on. Segments shared by both paths are not climbed.
#[must_use]
pub fn relative_url(target: &str, page_url: &str) -> String {
  let from = page_directory(page_url.trim_start_matches('/'));
  let to: Vec<&str> = target
    .trim_start_matches('/')
    .split('/')
    .filter(|segment| !segment.is_empty())
    .collect();

  let shared = from
    .iter()
    .zip(&to)
    .take_while(|(a, b)| a == b)
    .count();

  let mut parts: Vec<&str> = vec![".."; from.len() - shared];
  parts.extend(&to[shared..]);

  if parts.is_empty() {
    ".".to_string()
  } else {
    parts.join("/")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn root_pages_use_plain_paths() {
    assert_eq!(relative_url(STYLESHEET_PATH, ""), STYLESHEET_PATH);
    assert_eq!(relative_url(STYLESHEET_PATH, "index.html"), STYLESHEET_PATH);
    assert_eq!(relative_url(SCRIPT_PATH, "/"), SCRIPT_PATH);
  }

  #[test]
  fn nested_pages_climb_to_the_root() {
    assert_eq!(
      relative_url(STYLESHEET_PATH, "guide/"),
      "../assets/stylesheets/lightbox.min.css"
    );
    assert_eq!(
      relative_url(SCRIPT_PATH, "guide/setup.html"),
      "../assets/javascripts/lightbox.min.js"
    );
    assert_eq!(
      relative_url(SCRIPT_PATH, "a/b/c/"),
      "../../../assets/javascripts/lightbox.min.js"
    );
  }

  #[test]
  fn extensionless_last_segment_is_a_directory() {
    assert_eq!(
      relative_url(SCRIPT_PATH, "guide"),
      "../assets/javascripts/lightbox.min.js"
    );
  }

  #[test]
  fn shared_prefix_is_not_climbed() {
    assert_eq!(
      relative_url(STYLESHEET_PATH, "assets/notes/"),
      "../stylesheets/lightbox.min.css"
    );
  }

  #[test]
  fn base_path_is_stripped() {
    assert_eq!(site_relative("/docs/guide/", "docs"), "guide/");
    assert_eq!(site_relative("/docs/", "docs"), "");
    assert_eq!(site_relative("docs", "docs"), "");
    assert_eq!(site_relative("/docsite/x/", "docs"), "docsite/x/");
    assert_eq!(site_relative("/guide/", ""), "guide/");
  }
}
