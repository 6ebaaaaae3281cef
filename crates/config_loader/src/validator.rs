//! Configuration validation
//!
//! Rules:
//! - every store carries a non-empty `type`
//! - explicit store names are unique

use std::collections::HashSet;

use contracts::{ContractError, FanoutConfig};

/// Validate a FanoutConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &FanoutConfig) -> Result<(), ContractError> {
    validate_store_types(config)?;
    validate_store_names(config)?;
    Ok(())
}

/// Every store needs its type identifier
fn validate_store_types(config: &FanoutConfig) -> Result<(), ContractError> {
    for (index, store) in config.stores.iter().enumerate() {
        match store.store_type.as_deref() {
            Some(store_type) if !store_type.trim().is_empty() => {}
            _ => return Err(ContractError::MissingStoreType { index }),
        }
    }
    Ok(())
}

/// Explicit names must not collide
fn validate_store_names(config: &FanoutConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (index, store) in config.stores.iter().enumerate() {
        let Some(name) = store.name.as_deref() else {
            continue;
        };
        if name.is_empty() {
            return Err(ContractError::config_validation(
                format!("stores[{index}].name"),
                "store name cannot be empty",
            ));
        }
        if !seen.insert(name) {
            return Err(ContractError::config_validation(
                format!("stores[{index}].name"),
                format!("duplicate store name '{name}'"),
            ));
        }
    }
    Ok(())
}
