//! HTTP verbs handled by generated routes and their method variants.

use axum::routing::MethodFilter;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Patch,
    Put,
}

/// Sub-case within a verb: single item, whole collection, or draft write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    One,
    All,
    OneSoft,
}

const GET_METHODS: &[Method] = &[Method::One, Method::All];
const WRITE_METHODS: &[Method] = &[Method::One, Method::OneSoft];

impl Verb {
    /// Normalization order at startup.
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Patch, Verb::Put];

    /// Method variants valid for this verb.
    pub fn methods(self) -> &'static [Method] {
        match self {
            Verb::Get => GET_METHODS,
            Verb::Post | Verb::Patch | Verb::Put => WRITE_METHODS,
        }
    }

    pub fn supports(self, method: Method) -> bool {
        self.methods().contains(&method)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Patch => "PATCH",
            Verb::Put => "PUT",
        }
    }

    pub(crate) fn method_filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Put => MethodFilter::PUT,
        }
    }
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::One => "ONE",
            Method::All => "ALL",
            Method::OneSoft => "ONESOFT",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_sets_per_verb() {
        assert_eq!(Verb::Get.methods(), &[Method::One, Method::All]);
        for verb in [Verb::Post, Verb::Patch, Verb::Put] {
            assert_eq!(verb.methods(), &[Method::One, Method::OneSoft]);
            assert!(!verb.supports(Method::All));
        }
        assert!(!Verb::Get.supports(Method::OneSoft));
    }

    #[test]
    fn serde_names_match_display() {
        assert_eq!(serde_json::to_string(&Verb::Patch).unwrap(), "\"PATCH\"");
        assert_eq!(serde_json::to_string(&Method::OneSoft).unwrap(), "\"ONESOFT\"");
        let m: Method = serde_json::from_str("\"ALL\"").unwrap();
        assert_eq!(m.to_string(), "ALL");
    }
}
