//! Sparse verb configuration and its normalization into a complete hook table.

use super::noop::noop;
use super::verb::{Method, Verb};
use crate::error::ConfigError;
use crate::pipeline::BoxedMiddleware;
use std::collections::BTreeMap;

/// Caller-supplied hooks for one verb/method. Either side may be missing.
#[derive(Clone, Default)]
pub struct HookConfig {
    pub before: Option<BoxedMiddleware>,
    pub after: Option<BoxedMiddleware>,
}

impl HookConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, hook: BoxedMiddleware) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn after(mut self, hook: BoxedMiddleware) -> Self {
        self.after = Some(hook);
        self
    }
}

/// Complete hook pair. Both sides always present.
#[derive(Clone)]
pub struct HookPair {
    pub before: BoxedMiddleware,
    pub after: BoxedMiddleware,
}

/// Sparse configuration: a verb key being present enables that verb's routes.
#[derive(Clone, Default)]
pub struct VerbConfig {
    verbs: BTreeMap<Verb, BTreeMap<Method, HookConfig>>,
}

impl VerbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable a verb without configuring any hooks for it.
    pub fn enable(mut self, verb: Verb) -> Self {
        self.verbs.entry(verb).or_default();
        self
    }

    /// Set the hooks for one verb/method, enabling the verb.
    pub fn hook(mut self, verb: Verb, method: Method, hooks: HookConfig) -> Self {
        self.verbs.entry(verb).or_default().insert(method, hooks);
        self
    }

    pub fn before(mut self, verb: Verb, method: Method, hook: BoxedMiddleware) -> Self {
        self.entry(verb, method).before = Some(hook);
        self
    }

    pub fn after(mut self, verb: Verb, method: Method, hook: BoxedMiddleware) -> Self {
        self.entry(verb, method).after = Some(hook);
        self
    }

    pub fn is_enabled(&self, verb: Verb) -> bool {
        self.verbs.contains_key(&verb)
    }

    pub fn get(&self, verb: Verb, method: Method) -> Option<&HookConfig> {
        self.verbs.get(&verb)?.get(&method)
    }

    fn entry(&mut self, verb: Verb, method: Method) -> &mut HookConfig {
        self.verbs.entry(verb).or_default().entry(method).or_default()
    }

    /// Ensure `verb` has an entry and every method in `methods` has both hooks,
    /// filling gaps with the shared no-op. Hooks already set are kept.
    pub fn configure_verb(&mut self, verb: Verb, methods: &[Method]) {
        let entry = self.verbs.entry(verb).or_default();
        for method in methods {
            let hooks = entry.entry(*method).or_default();
            hooks.before.get_or_insert_with(noop);
            hooks.after.get_or_insert_with(noop);
        }
    }

    /// Reject method variants that do not exist for their verb.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (verb, methods) in &self.verbs {
            if let Some(method) = methods.keys().find(|m| !verb.supports(**m)) {
                return Err(ConfigError::UnsupportedMethod {
                    verb: *verb,
                    method: *method,
                });
            }
        }
        Ok(())
    }
}

/// Normalized hooks for every enabled verb. Read-only once built.
#[derive(Clone, Default)]
pub struct HookTable {
    verbs: BTreeMap<Verb, BTreeMap<Method, HookPair>>,
}

impl HookTable {
    pub fn get(&self, verb: Verb, method: Method) -> Option<&HookPair> {
        self.verbs.get(&verb)?.get(&method)
    }

    pub fn is_enabled(&self, verb: Verb) -> bool {
        self.verbs.contains_key(&verb)
    }

    pub fn enabled_verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.verbs.keys().copied()
    }
}

/// Validate `config`, fill every enabled verb in startup order and freeze it.
pub fn normalize(mut config: VerbConfig) -> Result<HookTable, ConfigError> {
    config.validate()?;
    for verb in Verb::ALL {
        if config.is_enabled(verb) {
            config.configure_verb(verb, verb.methods());
        }
    }
    let verbs = config
        .verbs
        .into_iter()
        .map(|(verb, methods)| {
            let pairs = methods
                .into_iter()
                .map(|(method, hooks)| {
                    let pair = HookPair {
                        before: hooks.before.unwrap_or_else(noop),
                        after: hooks.after.unwrap_or_else(noop),
                    };
                    (method, pair)
                })
                .collect();
            (verb, pairs)
        })
        .collect();
    Ok(HookTable { verbs })
}
