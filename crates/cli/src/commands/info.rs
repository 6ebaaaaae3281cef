//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::FanoutConfig;
use dispatcher::{DestinationRegistry, TagRule};

use crate::cli::InfoArgs;
use crate::error;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    deep_copy: bool,
    stores: Vec<StoreInfo>,
    available_types: Vec<String>,
}

#[derive(Serialize)]
struct StoreInfo {
    name: String,
    store_type: String,
    rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    emitted_tag: Option<String>,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = error::load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let info = build_config_info(&config, args.tag.as_deref());

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info, args.tag.as_deref());
    }

    Ok(())
}

fn build_config_info(config: &FanoutConfig, tag: Option<&str>) -> ConfigInfo {
    let stores = config
        .stores
        .iter()
        .enumerate()
        .map(|(index, store)| {
            let rule = TagRule::from_filter(store.filter.as_ref());
            StoreInfo {
                name: store.display_name(index),
                store_type: store.store_type.clone().unwrap_or_default(),
                rule: rule.to_string(),
                emitted_tag: tag.map(|t| rule.apply(t)),
                params: store.params.clone(),
            }
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", config.version),
        deep_copy: config.deep_copy,
        stores,
        available_types: DestinationRegistry::with_builtins()
            .types()
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

fn print_config_info(info: &ConfigInfo, tag: Option<&str>) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Fan-out Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("⚙️  Settings");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Deep copy: {}", info.deep_copy);
    println!("   └─ Available types: {}", info.available_types.join(", "));

    println!("\n📤 Stores ({})", info.stores.len());
    for (i, store) in info.stores.iter().enumerate() {
        let is_last = i == info.stores.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {} ({})", prefix, store.name, store.store_type);
        match (&store.emitted_tag, tag) {
            (Some(emitted), Some(tag)) => {
                println!("   {}  ├─ Rule: {}", child_prefix, store.rule);
                println!("   {}  └─ Tag: {} -> {}", child_prefix, tag, emitted);
            }
            _ => println!("   {}  └─ Rule: {}", child_prefix, store.rule),
        }
    }

    println!();
}
