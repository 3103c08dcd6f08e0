use crate::config::Config;

/// Plugin names that turn on the Material privacy integration.
const PRIVACY_PLUGINS: [&str; 2] = ["privacy", "material/privacy"];

/// Theme feature that enables client-side page navigation.
const INSTANT_NAVIGATION: &str = "navigation.instant";

/// Facts about the host build, resolved once per build and shared read-only by
/// every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnvironment {
  /// The site is rendered with the Material theme.
  pub material_theme: bool,

  /// Image sources are resolved on the client, so anchors carry no `href`.
  pub privacy: bool,

  /// Pages are swapped without a full reload and the viewer must be set up
  /// again after each navigation.
  pub instant_navigation: bool,

  /// Path the site is served under, without surrounding slashes. Empty when
  /// the site lives at the domain root.
  pub base_path: String,
}

impl BuildEnvironment {
  /// Derive the build environment from the loaded configuration.
  #[must_use]
  pub fn from_config(config: &Config) -> Self {
    let material_theme = config.theme.name.eq_ignore_ascii_case("material");
    let instant_navigation = material_theme
      || config
        .theme
        .features
        .iter()
        .any(|feature| feature == INSTANT_NAVIGATION);
    let privacy = material_theme
      && config
        .plugins
        .iter()
        .any(|plugin| PRIVACY_PLUGINS.contains(&plugin.as_str()));
    let base_path = config
      .site_url
      .as_deref()
      .map(url_path)
      .unwrap_or_default();

    log::debug!(
      "Build environment: material={material_theme}, privacy={privacy}, \
       instant_navigation={instant_navigation}, base_path='{base_path}'"
    );

    Self {
      material_theme,
      privacy,
      instant_navigation,
      base_path,
    }
  }
}

/// Path component of a site URL, without surrounding slashes.
fn url_path(site_url: &str) -> String {
  let without_scheme = site_url
    .split_once("://")
    .map_or(site_url, |(_, rest)| rest);
  let path = without_scheme
    .split_once('/')
    .map_or("", |(_, path)| path);
  let path = path.split(['?', '#']).next().unwrap_or_default();
  path.trim_matches('/').to_string()
}
