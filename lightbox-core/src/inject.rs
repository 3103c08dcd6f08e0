//! Injection of the viewer assets and its initialization into a page.
use std::sync::LazyLock;

use lightbox_config::{BuildEnvironment, EffectiveConfig};
use lightbox_templates::{MATERIAL_CSS, PATCH_CSS, PRIVACY_JS};
use log::{debug, error};
use regex::Regex;

use crate::{
  options::ViewerOptions,
  url::{SCRIPT_PATH, STYLESHEET_PATH, relative_url},
};

/// `id` of the inline patch stylesheet.
pub const STYLE_ID: &str = "lightbox-style";

/// `id` of the inline initialization script. Its presence marks a page as
/// already injected.
pub const INIT_SCRIPT_ID: &str = "init-lightbox";

/// Re-runs viewer setup after every instant navigation.
const RELOAD_HOOK_OPEN: &str = "document$.subscribe(()=>{ ";
const RELOAD_HOOK_CLOSE: &str = "lightbox.reload(); });";

#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static HEAD_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)</head\s*>").expect("Invalid head regex")
});

#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static BODY_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)</body\s*>").expect("Invalid body regex")
});

#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static INIT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)\bid\s*=\s*["']?init-lightbox\b"#)
    .expect("Invalid init marker regex")
});

/// Inject the viewer stylesheet, patch styles, script and initialization into
/// a full document.
///
/// The stylesheet link, the `<style id="lightbox-style">` block and the script
/// tag go at the end of `<head>`; the `<script id="init-lightbox">` block goes
/// at the end of `<body>`.
///
/// # Arguments
///
/// * `html` - The full document
/// * `page_url` - Site-relative URL of the page, for the asset links
/// * `effective` - Options in effect for the page
/// * `env` - Facts about the host build
///
/// # Returns
///
/// The injected document, or [`None`] when the page has no `</head>` or
/// `</body>`, or was injected before.
#[must_use]
pub fn inject_assets(
  html: &str,
  page_url: &str,
  effective: &EffectiveConfig<'_>,
  env: &BuildEnvironment,
) -> Option<String> {
  if INIT_MARKER.is_match(html) {
    debug!("{page_url}: lightbox already injected");
    return None;
  }

  let Some(head_close) = HEAD_CLOSE.find(html) else {
    debug!("{page_url}: no </head>, skipping asset injection");
    return None;
  };
  let Some(body_close) = BODY_CLOSE.find_iter(html).last() else {
    debug!("{page_url}: no </body>, skipping asset injection");
    return None;
  };
  if body_close.start() < head_close.end() {
    debug!("{page_url}: </body> precedes </head>, skipping asset injection");
    return None;
  }

  let init = match init_script(effective, env) {
    Ok(init) => init,
    Err(e) => {
      error!("{page_url}: failed to render viewer options: {e}");
      return None;
    },
  };
  let head = head_assets(page_url, effective, env);

  let mut out = String::with_capacity(html.len() + head.len() + init.len());
  out.push_str(&html[..head_close.start()]);
  out.push_str(&head);
  out.push_str(&html[head_close.start()..body_close.start()]);
  out.push_str(&init);
  out.push_str(&html[body_close.start()..]);
  Some(out)
}

/// Stylesheet link, patch styles and script tag for the end of `<head>`.
fn head_assets(
  page_url: &str,
  effective: &EffectiveConfig<'_>,
  env: &BuildEnvironment,
) -> String {
  let stylesheet = html_escape::encode_double_quoted_attribute(&relative_url(
    STYLESHEET_PATH,
    page_url,
  ))
  .into_owned();
  let script = html_escape::encode_double_quoted_attribute(&relative_url(
    SCRIPT_PATH,
    page_url,
  ))
  .into_owned();

  format!(
    "<link href=\"{stylesheet}\" rel=\"stylesheet\"><style \
     id=\"{STYLE_ID}\">{}</style><script src=\"{script}\"></script>",
    patch_css(effective, env)
  )
}

/// Fixed overrides plus the rules that depend on the configuration.
#[must_use]
pub fn patch_css(
  effective: &EffectiveConfig<'_>,
  env: &BuildEnvironment,
) -> String {
  let global = effective.global;
  let mut css = PATCH_CSS.trim_end().to_string();

  if global.has_custom_background() {
    // Keep the value inside the style element
    let background = global.background.replace('<', "");
    css.push_str(&format!(
      "\n.gslide-image img {{ background: {background}; }}"
    ));
  }

  if !global.shadow {
    css.push_str(
      "\n.glightbox-clean .gslide-media { -webkit-box-shadow: none; \
       box-shadow: none; }",
    );
  }

  if env.material_theme {
    css.push('\n');
    css.push_str(MATERIAL_CSS.trim_end());
  }

  css
}

/// The `<script id="init-lightbox">` block constructing the viewer.
///
/// # Errors
///
/// Returns an error if the viewer options cannot be serialized.
pub fn init_script(
  effective: &EffectiveConfig<'_>,
  env: &BuildEnvironment,
) -> Result<String, serde_json::Error> {
  let options = ViewerOptions::from(effective.global).to_json()?;
  let privacy = if env.privacy { PRIVACY_JS.trim_end() } else { "" };

  let mut script = format!("<script id=\"{INIT_SCRIPT_ID}\">");
  script.push_str(privacy);
  script.push_str(&format!("const lightbox = Viewer({options});"));
  if env.instant_navigation {
    script.push_str(RELOAD_HOOK_OPEN);
    script.push_str(privacy);
    script.push_str(RELOAD_HOOK_CLOSE);
  }
  script.push_str("</script>");
  Ok(script)
}
