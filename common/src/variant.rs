use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// The CI/CD tools being compared
///
/// Every per-tool stack family is replicated once for each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolVariant {
    GitHub,
    GitLab,
    CodePipeline,
}

impl ToolVariant {
    pub const ALL: [ToolVariant; 3] = [
        ToolVariant::GitHub,
        ToolVariant::GitLab,
        ToolVariant::CodePipeline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolVariant::GitHub => "github",
            ToolVariant::GitLab => "gitlab",
            ToolVariant::CodePipeline => "codepipeline",
        }
    }

    /// Port the tool's API listens on, shared by its Lambda, ECS and EC2 stacks
    pub fn port(&self) -> u16 {
        match self {
            ToolVariant::GitHub => 8080,
            ToolVariant::GitLab => 8081,
            ToolVariant::CodePipeline => 8082,
        }
    }
}

impl Display for ToolVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToolVariant {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ToolVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str() == value.trim().to_lowercase())
            .ok_or_else(|| ConfigError::UnknownVariant(value.to_string()))
    }
}

/// Exactly one value per tool variant
///
/// A missing variant is a compile error rather than a missing map key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PerVariant<T> {
    pub github: T,
    pub gitlab: T,
    pub codepipeline: T,
}

impl<T> PerVariant<T> {
    pub fn from_fn(mut f: impl FnMut(ToolVariant) -> T) -> Self {
        Self {
            github: f(ToolVariant::GitHub),
            gitlab: f(ToolVariant::GitLab),
            codepipeline: f(ToolVariant::CodePipeline),
        }
    }

    /// Same as `from_fn`, stopping at the first error
    pub fn try_from_fn<E>(mut f: impl FnMut(ToolVariant) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            github: f(ToolVariant::GitHub)?,
            gitlab: f(ToolVariant::GitLab)?,
            codepipeline: f(ToolVariant::CodePipeline)?,
        })
    }

    pub fn get(&self, variant: ToolVariant) -> &T {
        match variant {
            ToolVariant::GitHub => &self.github,
            ToolVariant::GitLab => &self.gitlab,
            ToolVariant::CodePipeline => &self.codepipeline,
        }
    }

    /// Values in `ToolVariant::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (ToolVariant, &T)> {
        ToolVariant::ALL
            .into_iter()
            .map(move |variant| (variant, self.get(variant)))
    }
}
