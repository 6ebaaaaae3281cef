//! Configuration parsing
//!
//! TOML (primary) and JSON formats.

use contracts::{ContractError, FanoutConfig};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<FanoutConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<FanoutConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<FanoutConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[[stores]]
type = "memory"
name = "c0"

[[stores]]
type = "memory"
name = "c1"
[stores.filter]
tag = "second"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert!(!config.deep_copy);
        assert_eq!(config.stores.len(), 2);
        assert!(config.stores[0].filter.is_none());
        assert_eq!(
            config.stores[1].filter.as_ref().and_then(|f| f.tag.as_deref()),
            Some("second")
        );
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "deep_copy": true,
            "stores": [
                { "type": "file", "params": { "path": "/tmp/out.jsonl" } },
                { "type": "log", "filter": { "remove_tag_prefix": "app" } }
            ]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.deep_copy);
        assert_eq!(config.stores[0].param("path"), Some("/tmp/out.jsonl"));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_store_without_type_still_parses() {
        // Rejected by validation, not by the parser
        let config = parse_toml("[[stores]]\nname = \"orphan\"\n").unwrap();
        assert!(config.stores[0].store_type.is_none());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
