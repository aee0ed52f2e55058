//! Named hooks that JSON config can refer to.

use crate::config::EntityConfig;
use crate::error::ConfigError;
use crate::hooks::{noop, HookConfig, VerbConfig};
use crate::pipeline::BoxedMiddleware;
use std::collections::HashMap;

/// Name under which the shared no-op hook is always registered.
pub const NOOP_HOOK: &str = "noop";

#[derive(Clone)]
pub struct HookRegistry {
    hooks: HashMap<String, BoxedMiddleware>,
}

impl HookRegistry {
    pub fn new() -> Self {
        let mut hooks = HashMap::new();
        hooks.insert(NOOP_HOOK.to_string(), noop());
        Self { hooks }
    }

    pub fn register(&mut self, name: impl Into<String>, hook: BoxedMiddleware) -> &mut Self {
        self.hooks.insert(name.into(), hook);
        self
    }

    pub fn with(mut self, name: impl Into<String>, hook: BoxedMiddleware) -> Self {
        self.register(name, hook);
        self
    }

    pub fn get(&self, name: &str) -> Option<&BoxedMiddleware> {
        self.hooks.get(name)
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityConfig {
    /// Resolve hook names against `registry` into a sparse [`VerbConfig`].
    pub fn verb_config(&self, registry: &HookRegistry) -> Result<VerbConfig, ConfigError> {
        let mut config = VerbConfig::new();
        for (verb, methods) in &self.types {
            config = config.enable(*verb);
            for (method, refs) in methods {
                let lookup = |name: &Option<String>| -> Result<Option<BoxedMiddleware>, ConfigError> {
                    match name {
                        None => Ok(None),
                        Some(name) => registry.get(name).cloned().map(Some).ok_or_else(|| {
                            ConfigError::UnknownHook {
                                verb: *verb,
                                method: *method,
                                name: name.clone(),
                            }
                        }),
                    }
                };
                let hooks = HookConfig {
                    before: lookup(&refs.before)?,
                    after: lookup(&refs.after)?,
                };
                config = config.hook(*verb, *method, hooks);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::hooks::{is_noop, Method, Verb};
    use crate::pipeline::{middleware, Next};
    use axum::extract::Request;
    use std::sync::Arc;

    fn entity(json: &str) -> EntityConfig {
        ServiceConfig::from_json(json).unwrap().entities.remove(0)
    }

    #[test]
    fn resolves_named_hooks() {
        let auth = middleware(|req: Request, next: Next| next.run(req));
        let registry = HookRegistry::new().with("auth", auth.clone());
        let config = entity(
            r#"{"entities":[{"collection":"items","types":{"POST":{"ONE":{"before":"auth","after":"noop"}},"GET":{}}}]}"#,
        );
        let verbs = config.verb_config(&registry).unwrap();
        assert!(verbs.is_enabled(Verb::Get));
        assert!(!verbs.is_enabled(Verb::Put));
        let hooks = verbs.get(Verb::Post, Method::One).unwrap();
        assert!(Arc::ptr_eq(hooks.before.as_ref().unwrap(), &auth));
        assert!(is_noop(hooks.after.as_ref().unwrap()));
    }

    #[test]
    fn unknown_hook_is_an_error() {
        let config = entity(r#"{"entities":[{"collection":"items","types":{"PUT":{"ONESOFT":{"after":"audit"}}}}]}"#);
        match config.verb_config(&HookRegistry::new()) {
            Err(ConfigError::UnknownHook { verb, method, name }) => {
                assert_eq!((verb, method, name.as_str()), (Verb::Put, Method::OneSoft, "audit"));
            }
            _ => panic!("expected UnknownHook"),
        }
    }
}
