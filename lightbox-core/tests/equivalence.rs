#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
//! Both annotators must agree on which images are wrapped and with what.
use std::collections::BTreeMap;

use lightbox_config::{BuildEnvironment, EffectiveConfig, LightboxConfig};
use lightbox_core::{
  AnnotateContext,
  AnnotatedHtml,
  ImageAnnotator,
  PatternAnnotator,
  TreeAnnotator,
};
use tendril::TendrilSink;

type WrappedImage = (String, BTreeMap<String, String>);

/// `(src, anchor attributes)` of every wrapped image, in document order.
fn wrapped_images(html: &str) -> Vec<WrappedImage> {
  let document = kuchikikiki::parse_html().one(html);
  document
    .select("a.glightbox > img")
    .unwrap()
    .map(|image| {
      let src = image
        .attributes
        .borrow()
        .get("src")
        .unwrap_or_default()
        .to_string();
      let anchor = image.as_node().parent().unwrap();
      let attributes = anchor
        .as_element()
        .unwrap()
        .attributes
        .borrow()
        .map
        .iter()
        .map(|(name, attribute)| {
          (name.local.to_string(), attribute.value.clone())
        })
        .collect();
      (src, attributes)
    })
    .collect()
}

fn annotate_both(
  html: &str,
  global: &LightboxConfig,
  env: &BuildEnvironment,
) -> (AnnotatedHtml, AnnotatedHtml) {
  let cx = AnnotateContext {
    url: "equivalence/",
    effective: EffectiveConfig::global(global),
    env,
  };
  (TreeAnnotator.annotate(html, &cx), PatternAnnotator.annotate(html, &cx))
}

fn assert_equivalent(
  html: &str,
  global: &LightboxConfig,
  env: &BuildEnvironment,
) {
  let (tree, pattern) = annotate_both(html, global, env);

  assert_eq!(
    tree.outcomes, pattern.outcomes,
    "outcomes differ for:\n{html}"
  );
  assert_eq!(
    wrapped_images(&tree.html),
    wrapped_images(&pattern.html),
    "wrapped images differ for:\n{html}\ntree:\n{}\npattern:\n{}",
    tree.html,
    pattern.html
  );
}

const GALLERY: &str = r##"
<h1>Gallery</h1>
<p>Intro <img src="inline.png" alt="Inline"> text.</p>
<figure>
  <img src="figure.png" alt="A figure" data-title="Figure title"
       data-description="Longer &amp; richer">
  <figcaption>Caption</figcaption>
</figure>
<p><a href="https://example.com"><img src="linked.png" alt="Linked"></a></p>
<p><img class="twemoji" src="smile.svg" alt=":)">
<img src="themed.png#only-light" alt="Light"></p>
<p><img src="dark.png#gh-dark-mode-only" alt="Dark" data-gallery="screens"></p>
<table><tr><td>
<IMG SRC='cell.png' ALT='Cell' CLASS="on-glb wide">
</td></tr></table>
<ul><li>
<img src="item.png" data-caption-position="right" data-gallery="list">
</li></ul>
<img src="a.png?x=1&amp;y=2" alt="Query">
<img alt="No source">
<script>var html = '<img src="script.png">';</script>
<!-- <img src="commented.png"> -->
<textarea><img src="text.png"></textarea>
<picture><source srcset="big.webp">
<img src="picture.png" alt="Picture"></picture>
<img src="selfclosing.png" alt="Self" />
<p><img src="compare.png" alt="x < y"> <img src='less.png' alt='1<2'></p>
<a-scene><a-assets><img src="scene.png" alt="Scene"></a-assets></a-scene>
<p><a href="https://example.com/after">after the scene</a></p>
"##;

#[test]
fn gallery_page_default_options() {
  assert_equivalent(
    GALLERY,
    &LightboxConfig::default(),
    &BuildEnvironment::default(),
  );
}

#[test]
fn gallery_page_with_every_toggle() {
  let global = LightboxConfig {
    auto_caption: true,
    auto_themed: true,
    skip_classes: vec!["wide".to_string()],
    width: "80vw".to_string(),
    height: String::new(),
    ..LightboxConfig::default()
  };
  let env = BuildEnvironment {
    material_theme: true,
    privacy: true,
    instant_navigation: true,
    base_path: String::new(),
  };

  assert_equivalent(GALLERY, &global, &env);
}

#[test]
fn gallery_page_manual_mode() {
  let global = LightboxConfig {
    manual: true,
    ..LightboxConfig::default()
  };

  assert_equivalent(GALLERY, &global, &BuildEnvironment::default());
}

#[test]
fn full_document() {
  let html = format!(
    "<!DOCTYPE html><html><head><title>T</title><style>img {{ border: 0 \
     }}</style></head><body>{GALLERY}</body></html>"
  );

  assert_equivalent(
    &html,
    &LightboxConfig::default(),
    &BuildEnvironment::default(),
  );
}

#[test]
fn angle_brackets_in_values_and_custom_elements() {
  let html = concat!(
    r#"<p><img src="a.png" alt="x < y"></p>"#,
    r#"<a-scene><img src="b.png"></a-scene>"#,
    r#"<p><a href="x">y</a></p>"#
  );
  let (tree, pattern) = annotate_both(
    html,
    &LightboxConfig::default(),
    &BuildEnvironment::default(),
  );

  assert_eq!(tree.wrapped_count(), 2);
  assert_eq!(pattern.outcomes, tree.outcomes);
  assert_eq!(wrapped_images(&tree.html), wrapped_images(&pattern.html));
}

#[test]
fn empty_height_is_omitted_by_both() {
  let global = LightboxConfig {
    height: String::new(),
    ..LightboxConfig::default()
  };
  let (tree, pattern) = annotate_both(
    r#"<img src="a.png">"#,
    &global,
    &BuildEnvironment::default(),
  );

  for html in [&tree.html, &pattern.html] {
    let images = wrapped_images(html);
    assert_eq!(images.len(), 1);
    assert!(!images[0].1.contains_key("data-height"));
  }
}

#[test]
fn large_generated_page() {
  use std::fmt::Write;

  let mut html = String::new();
  for i in 0..500 {
    let class = match i % 4 {
      0 => "twemoji",
      1 => "on-glb",
      _ => "plain",
    };
    write!(
      html,
      "<p>Paragraph {i}<img src=\"img-{i}.png\" alt=\"Image {i}\" \
       class=\"{class}\"></p>"
    )
    .unwrap();
  }

  let (tree, pattern) = annotate_both(
    &html,
    &LightboxConfig::default(),
    &BuildEnvironment::default(),
  );
  assert_eq!(tree.wrapped_count(), 375);
  assert_eq!(tree.outcomes, pattern.outcomes);
  assert_eq!(wrapped_images(&tree.html), wrapped_images(&pattern.html));
}
