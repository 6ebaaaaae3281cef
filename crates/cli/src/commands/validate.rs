//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::FanoutConfig;
use dispatcher::{Coordinator, DestinationRegistry};

use crate::cli::ValidateArgs;
use crate::error;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    deep_copy: bool,
    store_count: usize,
    store_types: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    let config = match error::load_config(&args.config) {
        Ok(config) => config,
        Err(e) => return ValidationResult::invalid(config_path, e.to_string()),
    };

    // Building the destinations catches unknown types and bad parameters
    let registry = DestinationRegistry::with_builtins();
    if let Err(e) = Coordinator::configure(&config, &registry) {
        return ValidationResult::invalid(config_path, e.to_string());
    }

    let warnings = collect_warnings(&config);
    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            version: format!("{:?}", config.version),
            deep_copy: config.deep_copy,
            store_count: config.stores.len(),
            store_types: config
                .stores
                .iter()
                .filter_map(|s| s.store_type.clone())
                .collect(),
        }),
    }
}

impl ValidationResult {
    fn invalid(config_path: String, error: String) -> Self {
        Self {
            valid: false,
            config_path,
            error: Some(error),
            warnings: None,
            summary: None,
        }
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &FanoutConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.stores.is_empty() {
        warnings.push("No stores configured - batches go straight to the next stage".to_string());
    }

    for (index, store) in config.stores.iter().enumerate() {
        let Some(filter) = &store.filter else {
            continue;
        };
        if filter.has_shadowed_directives() {
            warnings.push(format!(
                "Store '{}' sets a fixed tag; its prefix/suffix directives are ignored",
                store.display_name(index)
            ));
        }
    }

    if config.deep_copy && config.stores.len() <= 1 {
        warnings.push("deep_copy has no effect with fewer than two stores".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Deep copy: {}", summary.deep_copy);
            println!("  Stores: {}", summary.store_count);
            if !summary.store_types.is_empty() {
                println!("  Types: {}", summary.store_types.join(", "));
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
