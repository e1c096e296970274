//! Allow-list schema used by the sanitizer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tags that are dropped with their entire subtree when not explicitly
/// allowed. Everything else that is unknown merely unwraps.
const UNSAFE_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "applet", "base", "form", "frame",
    "frameset", "link", "meta", "noscript", "template",
];

/// The set of permitted tags and attributes for untrusted markup.
///
/// Attribute permission for a tag is the union of that tag's entry in
/// `allowed_attributes_by_tag` and `global_attributes`. Collections are
/// ordered so filtering is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SanitizationSchema {
    /// Permitted tag names (lowercase).
    pub allowed_tags: BTreeSet<String>,
    /// Per-tag permitted attribute names.
    pub allowed_attributes_by_tag: BTreeMap<String, BTreeSet<String>>,
    /// Attribute names permitted on any allowed tag.
    pub global_attributes: BTreeSet<String>,
}

impl SanitizationSchema {
    /// Returns true if the tag is permitted.
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    /// Returns true if the attribute is permitted on the tag.
    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        if self.global_attributes.contains(attribute) {
            return true;
        }
        self.allowed_attributes_by_tag
            .get(tag)
            .is_some_and(|set| set.contains(attribute))
    }

    /// Returns true if a disallowed tag must be dropped with its subtree
    /// rather than unwrapped.
    pub fn drops_subtree(&self, tag: &str) -> bool {
        !self.allows_tag(tag) && UNSAFE_TAGS.contains(&tag)
    }

    /// An empty schema: every tag unwraps or drops, all attributes removed.
    pub fn empty() -> Self {
        Self {
            allowed_tags: BTreeSet::new(),
            allowed_attributes_by_tag: BTreeMap::new(),
            global_attributes: BTreeSet::new(),
        }
    }
}

impl Default for SanitizationSchema {
    /// The default allow-list, active unless explicitly disabled: common
    /// text-level, structural, list, table, and media tags, with a small
    /// per-tag attribute set and a few global attributes.
    fn default() -> Self {
        let allowed_tags = [
            // Text-level semantics
            "a", "abbr", "b", "strong", "i", "em", "cite", "code", "dfn", "kbd", "mark", "q",
            "s", "samp", "small", "span", "sub", "sup", "u", "var", "del", "ins",
            // Structural / grouping
            "div", "p", "blockquote", "hr", "pre", "section", "article", "aside",
            // Headings
            "h1", "h2", "h3", "h4", "h5", "h6",
            // Lists
            "ul", "ol", "li", "dl", "dt", "dd",
            // Tables
            "table", "thead", "tbody", "tfoot", "tr", "th", "td",
            // Media and misc
            "img", "br", "details", "summary", "time", "input",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let allowed_attributes_by_tag = [
            ("a", vec!["href", "title", "target", "rel"]),
            ("img", vec!["src", "alt", "title", "width", "height"]),
            ("th", vec!["align"]),
            ("td", vec!["align"]),
            ("ol", vec!["start"]),
            ("time", vec!["datetime"]),
            ("input", vec!["type", "checked", "disabled"]),
        ]
        .into_iter()
        .map(|(tag, attrs)| {
            (
                tag.to_string(),
                attrs.into_iter().map(String::from).collect(),
            )
        })
        .collect();

        let global_attributes = ["id", "class", "title", "role", "aria-label", "aria-hidden"]
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            allowed_tags,
            allowed_attributes_by_tag,
            global_attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_anchor_href_but_not_onclick() {
        let schema = SanitizationSchema::default();
        assert!(schema.allows_tag("a"));
        assert!(schema.allows_attribute("a", "href"));
        assert!(!schema.allows_attribute("a", "onclick"));
    }

    #[test]
    fn global_attributes_apply_to_any_tag() {
        let schema = SanitizationSchema::default();
        assert!(schema.allows_attribute("p", "id"));
        assert!(schema.allows_attribute("span", "class"));
    }

    #[test]
    fn script_drops_subtree_unknown_container_does_not() {
        let schema = SanitizationSchema::default();
        assert!(schema.drops_subtree("script"));
        assert!(schema.drops_subtree("style"));
        assert!(!schema.drops_subtree("foo"));
    }

    #[test]
    fn explicitly_allowed_iframe_is_kept() {
        let mut schema = SanitizationSchema::default();
        assert!(schema.drops_subtree("iframe"));
        schema.allowed_tags.insert("iframe".into());
        assert!(!schema.drops_subtree("iframe"));
        assert!(schema.allows_tag("iframe"));
    }

    #[test]
    fn deserializes_from_config_shape() {
        let json = r#"{
            "allowedTags": ["a", "b"],
            "allowedAttributesByTag": { "a": ["href"] },
            "globalAttributes": ["id"]
        }"#;
        let schema: SanitizationSchema = serde_json::from_str(json).unwrap();
        assert!(schema.allows_tag("b"));
        assert!(schema.allows_attribute("a", "href"));
        assert!(!schema.allows_tag("p"));
    }
}
