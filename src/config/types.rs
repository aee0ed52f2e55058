//! Declarative config types matching the JSON service description.

use crate::hooks::{Method, Verb};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hooks for one verb/method, referenced by registry name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HookRefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub collection: String,
    /// Verbs present here get routes; an empty object enables a verb with default hooks.
    #[serde(default)]
    pub types: BTreeMap<Verb, BTreeMap<Method, HookRefs>>,
}

/// All entities served by one process.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}
