use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recognized context parameter names
pub mod keys {
    pub const ENVIRONMENT: &str = "environment";
    pub const ENABLE_CODE_PIPELINE: &str = "enableCodePipeline";

    /// Older spelling of `enableCodePipeline`, used only when the latter is absent
    pub const ENABLE_PIPELINE: &str = "enablePipeline";

    pub const ENABLE_GITHUB_OIDC: &str = "enableGitHubOidc";
    pub const ENABLE_MONITORING: &str = "enableMonitoring";
    pub const GITHUB_OWNER: &str = "githubOwner";
    pub const GITHUB_REPO: &str = "githubRepo";
    pub const GITHUB_BRANCH: &str = "githubBranch";
    pub const GITHUB_CONNECTION_ARN: &str = "githubConnectionArn";
    pub const GITHUB_ORG: &str = "githubOrg";
}

/// Raw key-value context parameters
///
/// Values are kept as strings, the way they arrive from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Parse a `key=value` pair
    pub fn parse_pair(pair: &str) -> Result<(String, String), ConfigError> {
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(ConfigError::MalformedPair(pair.to_string())),
        }
    }

    /// Value of the parameter, blank values are treated as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Opt-in flag, on only for the exact value "true"
    pub fn is_enabled(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|value| value == "true")
    }

    /// Opt-out flag, off only for the exact value "false"
    pub fn is_disabled(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|value| value == "false")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Overlay the other context, its values win
    pub fn merge(&mut self, other: Context) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
