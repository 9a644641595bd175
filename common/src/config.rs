use crate::context::{keys, Context};
use crate::error::ConfigError;
use crate::naming::Naming;
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_ENVIRONMENT: &str = "local";
pub const DEFAULT_REGION: &str = "ap-northeast-1";
pub const DEFAULT_BRANCH: &str = "main";

/// Shipped as the default of `githubOrg`, never accepted when OIDC is enabled
pub const GITHUB_ORG_PLACEHOLDER: &str = "your-github-org";

static ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{12}$").expect("account pattern"));

static REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("region pattern"));

/// Account and region every stack is deployed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub account: Option<String>,
    pub region: String,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            account: None,
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl Target {
    /// Validate the account and region, falling back to the default region
    ///
    /// Blank values count as absent.
    pub fn new(account: Option<&str>, region: Option<&str>) -> Result<Self, ConfigError> {
        let account = account.map(str::trim).filter(|a| !a.is_empty());
        let region = region.map(str::trim).filter(|r| !r.is_empty());

        if let Some(account) = account {
            if !ACCOUNT.is_match(account) {
                return Err(ConfigError::InvalidValue {
                    key: "account".into(),
                    value: account.into(),
                    reason: "expected a 12-digit AWS account id".into(),
                });
            }
        }

        let region = region.unwrap_or(DEFAULT_REGION);

        if !REGION.is_match(region) {
            return Err(ConfigError::InvalidValue {
                key: "region".into(),
                value: region.into(),
                reason: "expected a region like ap-northeast-1".into(),
            });
        }

        Ok(Self {
            account: account.map(String::from),
            region: region.to_string(),
        })
    }
}

/// Source repository and connection of the CodePipeline stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub connection_arn: String,
}

/// Which GitHub workflows may assume the deploy role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcConfig {
    pub org: String,
    pub repo: Option<String>,
}

impl OidcConfig {
    /// The `sub` claim pattern trusted by the deploy role
    pub fn subject(&self) -> String {
        match &self.repo {
            Some(repo) => format!("repo:{}/{}:*", self.org, repo),
            None => format!("repo:{}/*", self.org),
        }
    }
}

/// Validated composition input
///
/// Optional stacks carry their parameters, so an enabled stack can't lack them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: String,
    pub target: Target,
    pub pipeline: Option<PipelineConfig>,
    pub oidc: Option<OidcConfig>,
    pub monitoring: bool,
}

impl Config {
    /// Resolve flags and parameters
    ///
    /// Missing parameters of all enabled stacks are reported together.
    pub fn from_context(context: &Context, target: Target) -> Result<Self, ConfigError> {
        let environment = context
            .get_or(keys::ENVIRONMENT, DEFAULT_ENVIRONMENT)
            .to_string();

        let pipeline_enabled = if context.contains(keys::ENABLE_CODE_PIPELINE) {
            context.is_enabled(keys::ENABLE_CODE_PIPELINE)
        } else {
            context.is_enabled(keys::ENABLE_PIPELINE)
        };

        let pipeline = pipeline_enabled
            .then(|| Self::pipeline(context))
            .transpose();

        let oidc = context
            .is_enabled(keys::ENABLE_GITHUB_OIDC)
            .then(|| Self::oidc(context))
            .transpose();

        let (pipeline, oidc) = match (pipeline, oidc) {
            (Ok(pipeline), Ok(oidc)) => (pipeline, oidc),
            (Err(first), Err(second)) => return Err(first.combine(second)),
            (Err(error), _) | (_, Err(error)) => return Err(error),
        };

        let config = Self {
            environment,
            target,
            pipeline,
            oidc,
            monitoring: !context.is_disabled(keys::ENABLE_MONITORING),
        };

        log::debug!(
            "Resolved config for {}: pipeline={}, oidc={}, monitoring={}",
            config.environment,
            config.pipeline.is_some(),
            config.oidc.is_some(),
            config.monitoring,
        );

        Ok(config)
    }

    pub fn naming(&self) -> Naming {
        Naming::new(&self.environment)
    }

    fn pipeline(context: &Context) -> Result<PipelineConfig, ConfigError> {
        let [owner, repo, connection_arn] = required(
            context,
            "CodePipeline stack",
            [
                keys::GITHUB_OWNER,
                keys::GITHUB_REPO,
                keys::GITHUB_CONNECTION_ARN,
            ],
        )?;

        if !connection_arn.starts_with("arn:") {
            return Err(ConfigError::InvalidValue {
                key: keys::GITHUB_CONNECTION_ARN.into(),
                value: connection_arn,
                reason: "expected a CodeStar connection ARN".into(),
            });
        }

        Ok(PipelineConfig {
            owner,
            repo,
            branch: context.get_or(keys::GITHUB_BRANCH, DEFAULT_BRANCH).to_string(),
            connection_arn,
        })
    }

    fn oidc(context: &Context) -> Result<OidcConfig, ConfigError> {
        let org = context
            .get(keys::GITHUB_ORG)
            .filter(|org| *org != GITHUB_ORG_PLACEHOLDER)
            .ok_or_else(|| ConfigError::MissingParameters {
                unit: "GitHub OIDC stack".into(),
                keys: vec![keys::GITHUB_ORG.into()],
            })?;

        Ok(OidcConfig {
            org: org.to_string(),
            repo: context.get(keys::GITHUB_REPO).map(String::from),
        })
    }
}

/// Collect all required values at once, so the error names every missing key
fn required<const N: usize>(
    context: &Context,
    unit: &str,
    names: [&str; N],
) -> Result<[String; N], ConfigError> {
    let missing: Vec<String> = names
        .iter()
        .filter(|key| context.get(key).is_none())
        .map(|key| key.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ConfigError::MissingParameters {
            unit: unit.to_string(),
            keys: missing,
        });
    }

    Ok(names.map(|key| context.get(key).unwrap_or_default().to_string()))
}
