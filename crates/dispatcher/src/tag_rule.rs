//! TagRule - per-destination tag rewrite
//!
//! A filter block compiles once into a [`TagRule`]; applying it is a pure,
//! total function of the incoming tag.
//!
//! Precedence:
//! 1. `tag` set: the fixed value, every other directive ignored
//! 2. otherwise: strip prefix, strip suffix, then add prefix and suffix
//!
//! Stripping is an exact `starts_with` / `ends_with` match and a no-op when
//! the tag does not match.

use std::fmt;

use contracts::TagFilter;

const SEPARATOR: char = '.';

/// Compiled tag rewrite rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRule {
    /// Always emit this tag
    Fixed(String),
    /// Strip and add prefix/suffix around the incoming tag
    Rewrite(TagTemplate),
}

/// Normalized prefix/suffix directives, separators included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTemplate {
    prefix_to_add: Option<String>,
    prefix_to_strip: Option<String>,
    suffix_to_add: Option<String>,
    suffix_to_strip: Option<String>,
}

impl Default for TagRule {
    fn default() -> Self {
        Self::identity()
    }
}

impl TagRule {
    /// Rule returning the tag unchanged
    pub fn identity() -> Self {
        Self::Rewrite(TagTemplate::default())
    }

    /// Compile a filter block
    pub fn compile(filter: &TagFilter) -> Self {
        if let Some(tag) = &filter.tag {
            return Self::Fixed(tag.clone());
        }

        Self::Rewrite(TagTemplate {
            prefix_to_add: filter.add_tag_prefix.as_deref().map(prefix_with_separator),
            prefix_to_strip: filter.remove_tag_prefix.as_deref().map(prefix_with_separator),
            suffix_to_add: filter.add_tag_suffix.as_deref().map(suffix_with_separator),
            suffix_to_strip: filter.remove_tag_suffix.as_deref().map(suffix_with_separator),
        })
    }

    /// Compile an optional filter block; no block means identity
    pub fn from_filter(filter: Option<&TagFilter>) -> Self {
        filter.map(Self::compile).unwrap_or_default()
    }

    /// Rewrite `tag`
    pub fn apply(&self, tag: &str) -> String {
        match self {
            Self::Fixed(fixed) => fixed.clone(),
            Self::Rewrite(template) => template.apply(tag),
        }
    }

    /// Whether the rule leaves every tag unchanged
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Rewrite(template) if *template == TagTemplate::default())
    }
}

impl TagTemplate {
    fn apply(&self, tag: &str) -> String {
        let mut body = tag;
        if let Some(prefix) = &self.prefix_to_strip {
            body = body.strip_prefix(prefix.as_str()).unwrap_or(body);
        }
        if let Some(suffix) = &self.suffix_to_strip {
            body = body.strip_suffix(suffix.as_str()).unwrap_or(body);
        }

        let prefix = self.prefix_to_add.as_deref().unwrap_or_default();
        let suffix = self.suffix_to_add.as_deref().unwrap_or_default();
        let mut out = String::with_capacity(prefix.len() + body.len() + suffix.len());
        out.push_str(prefix);
        out.push_str(body);
        out.push_str(suffix);
        out
    }
}

/// `"app"` and `"app."` both become `"app."`
fn prefix_with_separator(prefix: &str) -> String {
    let prefix = prefix.strip_suffix(SEPARATOR).unwrap_or(prefix);
    format!("{prefix}{SEPARATOR}")
}

/// `"log"` and `".log"` both become `".log"`
fn suffix_with_separator(suffix: &str) -> String {
    let suffix = suffix.strip_prefix(SEPARATOR).unwrap_or(suffix);
    format!("{SEPARATOR}{suffix}")
}

impl fmt::Display for TagRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let template = match self {
            Self::Fixed(tag) => return write!(f, "tag = {tag:?}"),
            Self::Rewrite(template) => template,
        };
        if self.is_identity() {
            return f.write_str("identity");
        }

        let steps = [
            ("remove prefix", &template.prefix_to_strip),
            ("remove suffix", &template.suffix_to_strip),
            ("add prefix", &template.prefix_to_add),
            ("add suffix", &template.suffix_to_add),
        ];
        let mut first = true;
        for (label, value) in steps {
            let Some(value) = value else { continue };
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{label} {value:?}")?;
            first = false;
        }
        Ok(())
    }
}
