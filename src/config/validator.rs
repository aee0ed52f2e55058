//! Config validation: collection identifiers and verb/method consistency.

use crate::config::ServiceConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

const COLLECTION_PATTERN: &str = r"^[a-z_][a-z0-9_]*$";

/// Collection identifiers double as mount paths and table names.
pub fn validate_collection(name: &str) -> Result<(), ConfigError> {
    let re = Regex::new(COLLECTION_PATTERN).map_err(|e| ConfigError::Load(e.to_string()))?;
    if !re.is_match(name) {
        return Err(ConfigError::InvalidCollection(name.to_string()));
    }
    Ok(())
}

pub fn validate(config: &ServiceConfig) -> Result<(), ConfigError> {
    let mut collections = HashSet::new();
    for entity in &config.entities {
        validate_collection(&entity.collection)?;
        if !collections.insert(entity.collection.as_str()) {
            return Err(ConfigError::DuplicateCollection(entity.collection.clone()));
        }
        for (verb, methods) in &entity.types {
            if let Some(method) = methods.keys().find(|m| !verb.supports(**m)) {
                return Err(ConfigError::UnsupportedMethod {
                    verb: *verb,
                    method: *method,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_identifiers() {
        assert!(validate_collection("items").is_ok());
        assert!(validate_collection("order_lines2").is_ok());
        for bad in ["", "Items", "1items", "items/draft", "a-b"] {
            assert!(
                matches!(validate_collection(bad), Err(ConfigError::InvalidCollection(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_duplicates_and_bad_methods() {
        let dup = r#"{"entities":[{"collection":"items"},{"collection":"items"}]}"#;
        assert!(matches!(
            ServiceConfig::from_json(dup),
            Err(ConfigError::DuplicateCollection(_))
        ));
        let bad = r#"{"entities":[{"collection":"items","types":{"GET":{"ONESOFT":{}}}}]}"#;
        assert!(matches!(
            ServiceConfig::from_json(bad),
            Err(ConfigError::UnsupportedMethod { .. })
        ));
    }
}
