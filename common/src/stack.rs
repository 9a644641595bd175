use crate::error::{ComposeError, ComposeResult};
use crate::naming::logical_id;
use crate::variant::ToolVariant;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Compute flavors replicated for every tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeKind {
    Lambda,
    Ecs,
    Ec2,
}

impl ComputeKind {
    pub const ALL: [ComputeKind; 3] = [ComputeKind::Lambda, ComputeKind::Ecs, ComputeKind::Ec2];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeKind::Lambda => "lambda",
            ComputeKind::Ecs => "ecs",
            ComputeKind::Ec2 => "ec2",
        }
    }

    /// IAM stack outputs the compute stack is handed
    pub fn roles(&self) -> &'static [&'static str] {
        match self {
            ComputeKind::Lambda => &[outputs::LAMBDA_EXECUTION_ROLE],
            ComputeKind::Ecs => &[outputs::ECS_TASK_EXECUTION_ROLE, outputs::ECS_TASK_ROLE],
            ComputeKind::Ec2 => &[outputs::EC2_INSTANCE_ROLE],
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ComputeKind::Lambda => "Lambda and API Gateway",
            ComputeKind::Ecs => "ECS Fargate service",
            ComputeKind::Ec2 => "EC2 instance",
        }
    }

    pub fn description(&self, variant: ToolVariant) -> String {
        format!(
            "{} infrastructure for CI/CD comparison project ({variant})",
            self.title()
        )
    }
}

impl Display for ComputeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output keys exposed by the stacks
pub mod outputs {
    pub const LAMBDA_EXECUTION_ROLE: &str = "lambdaExecutionRole";
    pub const ECS_TASK_EXECUTION_ROLE: &str = "ecsTaskExecutionRole";
    pub const ECS_TASK_ROLE: &str = "ecsTaskRole";
    pub const EC2_INSTANCE_ROLE: &str = "ec2InstanceRole";
    pub const CODE_PIPELINE_ROLE: &str = "codePipelineRole";
    pub const GITHUB_ACTIONS_ROLE: &str = "githubActionsRole";

    pub const VPC: &str = "vpc";
    pub const PRIVATE_SUBNETS: &str = "privateSubnets";
    pub const PUBLIC_SUBNETS: &str = "publicSubnets";

    pub const LOG_GROUP: &str = "logGroup";
    pub const ENDPOINT: &str = "endpoint";

    pub const PIPELINE_NAME: &str = "pipelineName";
    pub const OIDC_PROVIDER: &str = "oidcProvider";
    pub const DASHBOARD: &str = "dashboard";
    pub const ALARM_TOPIC: &str = "alarmTopic";

    /// Every role the IAM stack creates
    pub const IAM_ROLES: [&str; 6] = [
        LAMBDA_EXECUTION_ROLE,
        ECS_TASK_EXECUTION_ROLE,
        ECS_TASK_ROLE,
        EC2_INSTANCE_ROLE,
        CODE_PIPELINE_ROLE,
        GITHUB_ACTIONS_ROLE,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StackKind {
    #[serde(rename = "iam")]
    Iam,
    #[serde(rename = "network")]
    Network,
    #[serde(rename = "lambda")]
    Lambda,
    #[serde(rename = "ecs")]
    Ecs,
    #[serde(rename = "ec2")]
    Ec2,
    #[serde(rename = "pipeline")]
    Pipeline,
    #[serde(rename = "github-oidc")]
    GitHubOidc,
    #[serde(rename = "monitoring")]
    Monitoring,
}

impl StackKind {
    /// Purpose segment of the stack name
    pub fn purpose(&self) -> &'static str {
        match self {
            StackKind::Iam => "iam",
            StackKind::Network => "network",
            StackKind::Lambda => "lambda",
            StackKind::Ecs => "ecs",
            StackKind::Ec2 => "ec2",
            StackKind::Pipeline => "pipeline",
            StackKind::GitHubOidc => "github-oidc",
            StackKind::Monitoring => "monitoring",
        }
    }

}

impl From<ComputeKind> for StackKind {
    fn from(kind: ComputeKind) -> Self {
        match kind {
            ComputeKind::Lambda => StackKind::Lambda,
            ComputeKind::Ecs => StackKind::Ecs,
            ComputeKind::Ec2 => StackKind::Ec2,
        }
    }
}

impl Display for StackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.purpose())
    }
}

/// A stack output consumed by another stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub stack: String,
    pub output: String,
}

impl Reference {
    /// Name of the CloudFormation export backing the reference
    pub fn export_name(&self) -> String {
        format!("{}:{}", self.stack, self.output)
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.export_name())
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.export_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeProps {
    pub port: u16,
    pub vpc: Reference,
    pub roles: Vec<Reference>,
    pub log_group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IamProps {
    /// Output key to physical role name
    pub roles: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineProps {
    pub pipeline_name: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub connection_arn: String,
    pub role: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcProps {
    pub provider_url: String,
    pub audience: String,
    pub subject: String,
    pub role: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringProps {
    pub dashboard_name: String,
    pub alarm_topic_name: String,
    pub log_groups: Vec<Reference>,
}

/// Kind-specific settings of a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Properties {
    None,
    Iam(IamProps),
    Compute(ComputeProps),
    Pipeline(PipelineProps),
    GitHubOidc(OidcProps),
    Monitoring(MonitoringProps),
}

impl Properties {
    pub fn is_none(&self) -> bool {
        matches!(self, Properties::None)
    }
}

/// A composition unit
///
/// Built with the chained `with_*` methods and never changed after being added
/// to an assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    name: String,
    kind: StackKind,
    variant: Option<ToolVariant>,
    description: String,
    tags: BTreeMap<String, String>,
    dependencies: Vec<String>,
    outputs: BTreeMap<String, Reference>,
    properties: Properties,
}

impl Stack {
    pub fn new(name: &str, kind: StackKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            variant: None,
            description: description.to_string(),
            tags: BTreeMap::new(),
            dependencies: vec![],
            outputs: BTreeMap::new(),
            properties: Properties::None,
        }
    }

    pub fn with_variant(mut self, variant: ToolVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    /// Declare that this stack must be deployed after the other one
    pub fn depends_on(mut self, stack: &str) -> Self {
        if !self.dependencies.iter().any(|d| d == stack) {
            self.dependencies.push(stack.to_string());
        }

        self
    }

    pub fn with_output(mut self, key: &str) -> Self {
        let reference = Reference {
            stack: self.name.clone(),
            output: key.to_string(),
        };

        self.outputs.insert(key.to_string(), reference);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logical_id(&self) -> String {
        logical_id(&self.name)
    }

    pub fn kind(&self) -> StackKind {
        self.kind
    }

    pub fn variant(&self) -> Option<ToolVariant> {
        self.variant
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn outputs(&self) -> &BTreeMap<String, Reference> {
        &self.outputs
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Port of a compute stack
    pub fn port(&self) -> Option<u16> {
        match &self.properties {
            Properties::Compute(props) => Some(props.port),
            _ => None,
        }
    }

    /// Reference to one of the stack's outputs, for wiring into another stack
    pub fn reference(&self, output: &str) -> ComposeResult<Reference> {
        self.outputs
            .get(output)
            .cloned()
            .ok_or_else(|| ComposeError::OutputNotFound {
                stack: self.name.clone(),
                output: output.to_string(),
            })
    }
}
