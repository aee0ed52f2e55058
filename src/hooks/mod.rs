//! Verb/method hook configuration: sparse input, shared no-op default, normalized table.

mod noop;
mod normalizer;
mod verb;

pub use noop::{is_noop, noop};
pub use normalizer::{normalize, HookConfig, HookPair, HookTable, VerbConfig};
pub use verb::{Method, Verb};
