use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use log::{debug, error};
use markup5ever::{QualName, local_name, ns};
use tendril::TendrilSink;

use super::{
  AnnotateContext,
  ImageAnnotator,
  decide,
  is_full_document,
  process_safe,
};
use crate::types::{
  AnchorAttributes,
  AnnotatedHtml,
  ImageElement,
  ImageOutcome,
};

/// Rewrites the parsed DOM, moving each eligible `<img>` under a new anchor.
///
/// Pages without any wrapped image are returned byte for byte; otherwise the
/// whole tree is serialized again.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeAnnotator;

impl ImageAnnotator for TreeAnnotator {
  fn annotate(&self, html: &str, cx: &AnnotateContext<'_>) -> AnnotatedHtml {
    if html.is_empty() {
      return AnnotatedHtml::unchanged(html);
    }

    process_safe(cx.url, || annotate_tree(html, cx))
      .flatten()
      .unwrap_or_else(|| AnnotatedHtml::unchanged(html))
  }
}

fn annotate_tree(
  html: &str,
  cx: &AnnotateContext<'_>,
) -> Option<AnnotatedHtml> {
  let full_document = is_full_document(html);
  let document = if full_document {
    kuchikikiki::parse_html().one(html)
  } else {
    kuchikikiki::parse_fragment(
      QualName::new(None, ns!(html), local_name!("body")),
      Vec::new(),
    )
    .one(html)
  };

  // Collect first, the tree is mutated while wrapping
  let images: Vec<NodeRef> = document
    .select("img")
    .ok()?
    .map(|image| image.as_node().clone())
    .collect();

  let mut outcomes = Vec::with_capacity(images.len());
  for node in images {
    let Some(element) = node.as_element() else {
      continue;
    };
    let image = {
      let attributes = element.attributes.borrow();
      ImageElement::from_attributes(
        attributes.map.iter().map(|(name, attribute)| {
          (name.local.as_ref(), attribute.value.as_str())
        }),
        has_anchor_ancestor(&node),
      )
    };

    let outcome = decide(&image, cx);
    if let ImageOutcome::Wrapped { attributes, .. } = &outcome {
      let anchor = anchor_node(attributes);
      node.insert_before(anchor.clone());
      anchor.append(node.clone());
    }
    outcomes.push(outcome);
  }

  if !outcomes
    .iter()
    .any(|outcome| matches!(outcome, ImageOutcome::Wrapped { .. }))
  {
    return Some(AnnotatedHtml {
      html: html.to_string(),
      outcomes,
    });
  }

  let html = if full_document {
    serialize(&document)
  } else {
    serialize_fragment(&document)
  };

  match html {
    Some(html) => Some(AnnotatedHtml { html, outcomes }),
    None => {
      error!("{}: failed to serialize annotated page", cx.url);
      None
    },
  }
}

fn has_anchor_ancestor(node: &NodeRef) -> bool {
  node.ancestors().any(|ancestor| {
    ancestor
      .as_element()
      .is_some_and(|element| element.name.local.as_ref() == "a")
  })
}

fn anchor_node(attributes: &AnchorAttributes) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), local_name!("a")),
    attributes.pairs().into_iter().map(|(name, value)| {
      (ExpandedName::new("", name), Attribute {
        prefix: None,
        value:  value.to_string(),
      })
    }),
  )
}

fn serialize(node: &NodeRef) -> Option<String> {
  let mut out = Vec::new();
  node.serialize(&mut out).ok()?;
  String::from_utf8(out).ok()
}

/// Fragments parse into a synthetic `<html>` root; only its children belong
/// to the output.
fn serialize_fragment(document: &NodeRef) -> Option<String> {
  let Some(root) = document
    .children()
    .find(|child| child.as_element().is_some())
  else {
    debug!("Fragment parsed without a root element");
    return Some(String::new());
  };

  let mut out = Vec::new();
  for child in root.children() {
    child.serialize(&mut out).ok()?;
  }
  String::from_utf8(out).ok()
}
