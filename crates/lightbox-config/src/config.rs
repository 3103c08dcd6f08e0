use std::{
  collections::BTreeMap,
  fmt,
  fs,
  path::{Path, PathBuf},
  str::FromStr,
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, lightbox::LightboxConfig, page::PageMeta};

/// How images are located and wrapped inside a page.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
  /// Parse the page into a DOM and rewrite image nodes.
  #[default]
  Tree,
  /// Rewrite image tags directly in the page text.
  Pattern,
}

impl Strategy {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Tree => "tree",
      Self::Pattern => "pattern",
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Strategy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "tree" => Ok(Self::Tree),
      "pattern" => Ok(Self::Pattern),
      other => Err(format!("'{other}' is not one of tree, pattern")),
    }
  }
}

/// Theme facts of the host build that change what gets injected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
  /// Theme name, e.g. `material`.
  pub name: String,

  /// Enabled theme features, e.g. `navigation.instant`.
  pub features: Vec<String>,
}

/// Configuration for a lightbox build.
///
/// [`Config`] describes an already-built site to post-process: where it lives,
/// which viewer assets to copy into it, the host theme and plugins it was
/// built with, the global [`LightboxConfig`] and the per-page metadata the
/// pages were rendered from. Fields are loaded from a TOML or JSON config file
/// and can be adjusted with CLI arguments or `--config KEY=VALUE` overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory of the built site whose pages are rewritten in place.
  pub site_dir: PathBuf,

  /// Directory holding `lightbox.min.css` and `lightbox.min.js`.
  pub assets_dir: Option<PathBuf>,

  /// Number of threads to use for parallel processing.
  pub jobs: Option<usize>,

  /// Mutation strategy used for every page.
  pub strategy: Strategy,

  /// Public URL of the site. Its path component is stripped from page URLs.
  pub site_url: Option<String>,

  pub theme: ThemeConfig,

  /// Plugins enabled in the host build.
  pub plugins: Vec<String>,

  /// Global lightbox options.
  pub lightbox: LightboxConfig,

  /// Page metadata keyed by page URL (`""`, `about/`, `guide/setup.html`).
  pub pages: BTreeMap<String, PageMeta>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      site_dir:   PathBuf::from("site"),
      assets_dir: None,
      jobs:       None,
      strategy:   Strategy::Tree,
      site_url:   None,
      theme:      ThemeConfig::default(),
      plugins:    Vec::new(),
      lightbox:   LightboxConfig::default(),
      pages:      BTreeMap::new(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content)
          .map_err(ConfigError::from)
          .map_err(|e| {
            ConfigError::Config(format!(
              "Failed to parse JSON config from {}: {}",
              path.display(),
              e
            ))
          })
      },
      "toml" => {
        toml::from_str(&content)
          .map_err(ConfigError::from)
          .map_err(|e| {
            ConfigError::Config(format!(
              "Failed to parse TOML config from {}: {}",
              path.display(),
              e
            ))
          })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from config files and overrides.
  ///
  /// Explicit config files are loaded and merged in order. Without any, a
  /// config file is looked up in the usual locations, falling back to the
  /// defaults. `--config KEY=VALUE` overrides are applied last.
  ///
  /// # Arguments
  ///
  /// * `config_files` - Config files given on the command line.
  /// * `config_overrides` - Raw `KEY=VALUE` override strings.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          first.display(),
          e
        ))
      })?;

      for config_path in rest {
        let additional_config = Self::from_file(config_path).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load config from {}: {}",
            config_path.display(),
            e
          ))
        })?;
        merged_config.merge(additional_config);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      log::debug!("No config file found, using defaults");
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Arguments
  ///
  /// * `overrides` - KEY=VALUE strings to apply, in order.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust, ignore
  /// config.apply_overrides(&vec![
  ///     "lightbox.autoCaption=true".to_string(),
  ///     "strategy=pattern".to_string(),
  /// ])?;
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override. Empty values reset optional fields.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value cannot be parsed.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    if let Some(lightbox_key) = key.strip_prefix("lightbox.") {
      return self.lightbox.apply_override(lightbox_key, value);
    }

    match key {
      "site_dir" => self.site_dir = PathBuf::from(value),
      "assets_dir" => {
        self.assets_dir = non_empty(value).map(PathBuf::from);
      },
      "jobs" => {
        self.jobs = non_empty(value)
          .map(|jobs| parse_positive(key, jobs))
          .transpose()?;
      },
      "strategy" => self.strategy = parse_enum(key, value)?,
      "site_url" => self.site_url = non_empty(value).map(String::from),
      "theme.name" => self.theme.name = value.to_string(),
      "theme.features" => self.theme.features = parse_list(value),
      "plugins" => self.plugins = parse_list(value),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - [`Vec<T>`] fields: Other's entries are appended, skipping duplicates
  /// - Plain fields: Other's value replaces this one unless it is the default
  /// - `pages`: Other's page metadata is merged in key by key
  ///
  /// # Arguments
  ///
  /// * `other` - The config to merge in (takes precedence)
  pub fn merge(&mut self, other: Self) {
    let defaults = Self::default();

    if other.site_dir != defaults.site_dir {
      self.site_dir = other.site_dir;
    }
    if other.strategy != defaults.strategy {
      self.strategy = other.strategy;
    }
    if other.assets_dir.is_some() {
      self.assets_dir = other.assets_dir;
    }
    if other.jobs.is_some() {
      self.jobs = other.jobs;
    }
    if other.site_url.is_some() {
      self.site_url = other.site_url;
    }

    if !other.theme.name.is_empty() {
      self.theme.name = other.theme.name;
    }
    extend_unique(&mut self.theme.features, other.theme.features);
    extend_unique(&mut self.plugins, other.plugins);

    self.lightbox.merge(other.lightbox);

    for (url, meta) in other.pages {
      self.pages.entry(url).or_default().extend(meta);
    }
  }

  /// Metadata recorded for the page at `url`, if any.
  ///
  /// Keys may be written with or without a leading `/`.
  #[must_use]
  pub fn page_meta(&self, url: &str) -> Option<&PageMeta> {
    let url = url.trim_start_matches('/');
    self.pages.get(url).or_else(|| self.pages.get(&format!("/{url}")))
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "lightbox.toml",
          "lightbox.json",
          ".lightbox.toml",
          ".lightbox.json",
          ".config/lightbox.toml",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let config_path =
            PathBuf::from(xdg_config_home).join("lightbox.toml");
          if config_path.exists() {
            return Some(config_path);
          }
        }

        None
      })
      .clone()
  }

  /// Validate all paths specified in the configuration
  ///
  /// # Errors
  ///
  /// Returns an error if any configured path does not exist or is invalid.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if !self.site_dir.exists() {
      errors.push(format!(
        "Site directory does not exist: {}",
        self.site_dir.display()
      ));
    } else if !self.site_dir.is_dir() {
      errors.push(format!(
        "Site directory path is not a directory: {}",
        self.site_dir.display()
      ));
    }

    if let Some(ref assets_dir) = self.assets_dir {
      if !assets_dir.exists() {
        errors.push(format!(
          "Assets directory does not exist: {}",
          assets_dir.display()
        ));
      } else if !assets_dir.is_dir() {
        errors.push(format!(
          "Assets directory path is not a directory: {}",
          assets_dir.display()
        ));
      }
    }

    if self.jobs == Some(0) {
      errors.push("Number of jobs must be at least 1".to_string());
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content)?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

fn non_empty(value: &str) -> Option<&str> {
  (!value.is_empty()).then_some(value)
}

fn parse_list(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|item| !item.is_empty())
    .map(String::from)
    .collect()
}

fn extend_unique(target: &mut Vec<String>, items: Vec<String>) {
  for item in items {
    if !target.contains(&item) {
      target.push(item);
    }
  }
}

fn parse_positive(key: &str, value: &str) -> Result<usize, ConfigError> {
  value.parse::<usize>().map_err(|_| {
    ConfigError::Config(format!(
      "Invalid value for '{key}': '{value}'. Expected a positive integer"
    ))
  })
}

/// Parse a boolean override value.
pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}

/// Parse an override value into one of a closed set of options.
pub(crate) fn parse_enum<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
  T: FromStr<Err = String>,
{
  value.parse::<T>().map_err(|e| {
    ConfigError::Config(format!("Invalid value for '{key}': '{value}' - {e}"))
  })
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::useless_vec,
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use serde_json::Value;

  use super::*;

  #[test]
  fn test_from_file_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lightbox.toml");
    fs::write(
      &path,
      r#"
        site_dir = "public"
        strategy = "pattern"
        plugins = ["material/privacy"]

        [theme]
        name = "material"

        [lightbox]
        autoCaption = true

        [pages."about/"]
        glightbox = false
        "glightbox.auto_themed" = true
      "#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.site_dir, PathBuf::from("public"));
    assert_eq!(config.strategy, Strategy::Pattern);
    assert_eq!(config.theme.name, "material");
    assert!(config.lightbox.auto_caption);

    let about = config.page_meta("about/").unwrap();
    assert_eq!(about.get("glightbox"), Some(&Value::Bool(false)));
    assert_eq!(about.get("glightbox.auto_themed"), Some(&Value::Bool(true)));
  }

  #[test]
  fn test_from_file_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lightbox.json");
    fs::write(
      &path,
      r#"{"jobs": 2, "lightbox": {"manual": true, "skip_classes": ["x"]}}"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.jobs, Some(2));
    assert!(config.lightbox.manual);
    assert_eq!(config.lightbox.skip_classes, vec!["x".to_string()]);
  }

  #[test]
  fn test_from_file_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lightbox.yaml");
    fs::write(&path, "site_dir: site").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Unsupported config file format"));
  }

  #[test]
  fn test_load_merges_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.toml");
    let second = dir.path().join("b.toml");
    fs::write(
      &first,
      "plugins = [\"search\"]\n[lightbox]\nskipClasses = [\"a\"]\n",
    )
    .unwrap();
    fs::write(
      &second,
      "plugins = [\"privacy\"]\n[lightbox]\nskipClasses = [\"b\"]\nloop = \
       true\n",
    )
    .unwrap();

    let config = Config::load(&[first, second], &[]).unwrap();
    assert_eq!(config.plugins, vec!["search", "privacy"]);
    assert_eq!(config.lightbox.skip_classes, vec!["a", "b"]);
    assert!(config.lightbox.loop_gallery);
  }

  #[test]
  fn test_load_applies_overrides_last() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lightbox.toml");
    fs::write(&path, "strategy = \"pattern\"\n").unwrap();

    let config = Config::load(&[path], &vec![
      "strategy=tree".to_string(),
      "lightbox.effect=fade".to_string(),
    ])
    .unwrap();
    assert_eq!(config.strategy, Strategy::Tree);
    assert_eq!(config.lightbox.effect, crate::Effect::Fade);
  }

  #[test]
  fn test_merge_pages_by_key() {
    let mut base = Config::default();
    base
      .pages
      .entry("gallery/".to_string())
      .or_default()
      .insert("glightbox-manual".to_string(), Value::Bool(true));

    let mut other = Config::default();
    other
      .pages
      .entry("gallery/".to_string())
      .or_default()
      .insert("glightbox".to_string(), Value::Bool(true));

    base.merge(other);

    let gallery = base.page_meta("/gallery/").unwrap();
    assert_eq!(gallery.len(), 2);
  }

  #[test]
  fn test_merge_option_fields() {
    let mut base = Config::default();
    base.assets_dir = Some(PathBuf::from("vendor"));
    base.jobs = Some(4);

    let mut other = Config::default();
    other.jobs = Some(8);

    base.merge(other);

    assert_eq!(base.assets_dir, Some(PathBuf::from("vendor")));
    assert_eq!(base.jobs, Some(8));
  }

  #[test]
  fn test_apply_overrides_top_level() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec![
        "site_dir=/tmp/site".to_string(),
        "theme.name=material".to_string(),
        "theme.features=navigation.instant, toc.follow".to_string(),
        "jobs=3".to_string(),
      ])
      .unwrap();

    assert_eq!(config.site_dir, PathBuf::from("/tmp/site"));
    assert_eq!(config.theme.name, "material");
    assert_eq!(config.theme.features, vec![
      "navigation.instant",
      "toc.follow"
    ]);
    assert_eq!(config.jobs, Some(3));
  }

  #[test]
  fn test_apply_overrides_empty_resets_option() {
    let mut config = Config::default();
    config.assets_dir = Some(PathBuf::from("vendor"));

    config.apply_override("assets_dir", "").unwrap();
    assert_eq!(config.assets_dir, None);
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = Config::default();

    let result = config.apply_overrides(&vec!["no_equals_sign".to_string()]);

    assert!(result.is_err());
    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Expected KEY=VALUE")
    );
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = Config::default();

    let result = config.apply_overrides(&vec!["unknown_key=value".to_string()]);

    assert!(result.is_err());
    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Unknown configuration key")
    );
  }

  #[test]
  fn test_apply_overrides_invalid_numeric() {
    let mut config = Config::default();

    let result = config.apply_overrides(&vec!["jobs=not_a_number".to_string()]);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid value"));
  }

  #[test]
  fn test_validate_paths_reports_missing_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.site_dir = dir.path().join("missing-site");
    config.assets_dir = Some(dir.path().join("missing-assets"));

    let err = config.validate_paths().unwrap_err().to_string();
    assert!(err.contains("Site directory does not exist"));
    assert!(err.contains("Assets directory does not exist"));

    config.site_dir = dir.path().to_path_buf();
    config.assets_dir = None;
    assert!(config.validate_paths().is_ok());
  }

  #[test]
  fn test_generate_default_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();

    for format in ["toml", "json"] {
      let path = dir.path().join(format!("lightbox.{format}"));
      Config::generate_default_config(format, &path).unwrap();

      let config = Config::from_file(&path).unwrap();
      assert_eq!(config.site_dir, PathBuf::from("site"));
      assert_eq!(config.lightbox, LightboxConfig::default());
    }
  }

  #[test]
  fn test_generate_default_config_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lightbox.yaml");

    let err =
      Config::generate_default_config("yaml", &path).unwrap_err().to_string();
    assert!(err.contains("Unsupported config format"));
  }

  #[test]
  fn test_io_errors_keep_their_kind() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    assert!(matches!(Config::from_file(&missing), Err(ConfigError::Io(_))));

    let err = Config::load(&[missing], &[]).unwrap_err().to_string();
    assert!(err.contains("missing.toml"));

    let unwritable = dir.path().join("no-such-dir").join("lightbox.toml");
    assert!(matches!(
      Config::generate_default_config("toml", &unwritable),
      Err(ConfigError::Io(_))
    ));
  }
}
