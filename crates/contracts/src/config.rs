//! FanoutConfig - Config Loader output
//!
//! Describes the ordered store list, the per-store tag filter and the copy
//! policy of one fan-out group.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete fan-out configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Give every destination but the last its own copy of the records
    #[serde(default)]
    pub deep_copy: bool,

    /// Ordered destination list
    #[serde(default)]
    pub stores: Vec<StoreConfig>,
}

/// One `<store>` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Destination type identifier, required
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub store_type: Option<String>,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tag rewrite directives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<TagFilter>,

    /// Type-specific parameters
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,
}

impl StoreConfig {
    /// Create a store config of the given type
    pub fn of_type(store_type: impl Into<String>) -> Self {
        Self {
            store_type: Some(store_type.into()),
            ..Self::default()
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the tag filter
    pub fn with_filter(mut self, filter: TagFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Add a type-specific parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Name used in logs and metrics: explicit name, else `<type>#<index>`
    pub fn display_name(&self, index: usize) -> String {
        match (&self.name, &self.store_type) {
            (Some(name), _) => name.clone(),
            (None, Some(store_type)) => format!("{store_type}#{index}"),
            (None, None) => format!("store#{index}"),
        }
    }

    /// Look up a type-specific parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// `<filter>` block: tag rewrite directives
///
/// `tag` wins over everything else; the four edge directives combine freely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagFilter {
    /// Fixed replacement tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_tag_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_tag_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_tag_suffix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_tag_suffix: Option<String>,
}

impl TagFilter {
    /// Filter with a fixed tag
    pub fn fixed(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Whether no directive is set
    pub fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.add_tag_prefix.is_none()
            && self.remove_tag_prefix.is_none()
            && self.add_tag_suffix.is_none()
            && self.remove_tag_suffix.is_none()
    }

    /// Whether a fixed tag hides other directives
    pub fn has_shadowed_directives(&self) -> bool {
        self.tag.is_some()
            && (self.add_tag_prefix.is_some()
                || self.remove_tag_prefix.is_some()
                || self.add_tag_suffix.is_some()
                || self.remove_tag_suffix.is_some())
    }
}
