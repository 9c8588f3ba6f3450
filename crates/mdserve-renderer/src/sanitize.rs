//! HTML sanitization for rendered document bodies.

use std::iter;

use ammonia::Builder;

/// Strips disallowed markup from untrusted HTML.
pub trait HtmlSanitizer: Send + Sync {
    /// Return a cleaned copy of `html`.
    fn sanitize(&self, html: &str) -> String;
}

/// Allowlist additions on top of ammonia's user-generated-content defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizePolicy {
    extra_attributes: Vec<(&'static str, &'static str)>,
}

impl SanitizePolicy {
    /// Ammonia's defaults with nothing added.
    #[must_use]
    pub fn ugc() -> Self {
        Self {
            extra_attributes: Vec::new(),
        }
    }

    /// Allow `attr` on `tag`, allowing the tag itself if needed.
    #[must_use]
    pub fn allow_attribute(mut self, tag: &'static str, attr: &'static str) -> Self {
        self.extra_attributes.push((tag, attr));
        self
    }
}

impl Default for SanitizePolicy {
    /// User-generated-content defaults plus what the engine emits:
    /// inline highlight styles, heading anchors and task list checkboxes.
    fn default() -> Self {
        ["h1", "h2", "h3", "h4", "h5", "h6"].into_iter().fold(
            Self::ugc()
                .allow_attribute("span", "style")
                .allow_attribute("pre", "style")
                .allow_attribute("input", "type")
                .allow_attribute("input", "checked")
                .allow_attribute("input", "disabled"),
            |policy, tag| policy.allow_attribute(tag, "id"),
        )
    }
}

/// [`HtmlSanitizer`] backed by ammonia.
pub struct AmmoniaSanitizer {
    builder: Builder<'static>,
}

impl AmmoniaSanitizer {
    /// Build a sanitizer for the given policy.
    #[must_use]
    pub fn new(policy: &SanitizePolicy) -> Self {
        let mut builder = Builder::default();
        for &(tag, attr) in &policy.extra_attributes {
            builder.add_tags(iter::once(tag));
            builder.add_tag_attributes(tag, iter::once(attr));
        }
        Self { builder }
    }
}

impl Default for AmmoniaSanitizer {
    fn default() -> Self {
        Self::new(&SanitizePolicy::default())
    }
}

impl std::fmt::Debug for AmmoniaSanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmmoniaSanitizer").finish_non_exhaustive()
    }
}

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}
