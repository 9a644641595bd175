use crate::error::{ComposeError, ComposeResult};
use crate::stack::ComputeKind;
use crate::variant::ToolVariant;
use regex::Regex;
use std::sync::LazyLock;

/// Project namespace, the first segment of every resource name
pub const SERVICE_NAME: &str = "cicd-comparison";

pub const DELIMITER: &str = "-";

/// CloudFormation limit for stack names
const MAX_STACK_NAME_LENGTH: usize = 128;

static STACK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("stack name pattern"));

/// Resource naming convention
///
/// `<service>-<environment>-<resource type>-<purpose>[-<sequence>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    service_name: String,
    environment: String,
}

impl Naming {
    pub fn new(environment: &str) -> Self {
        Self::with_service(SERVICE_NAME, environment)
    }

    fn with_service(service_name: &str, environment: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            environment: environment.to_string(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn resource_name(&self, resource_type: &str, purpose: &str, sequence: Option<u32>) -> String {
        let mut parts = vec![
            self.service_name.clone(),
            self.environment.clone(),
            resource_type.to_string(),
            purpose.to_string(),
        ];

        if let Some(sequence) = sequence {
            parts.push(sequence.to_string());
        }

        parts.join(DELIMITER)
    }

    pub fn stack_name(&self, purpose: &str) -> String {
        self.resource_name("stack", purpose, None)
    }

    /// Stack name prefixed with the tool, e.g. `gitlab-cicd-comparison-local-stack-ecs`
    pub fn variant_stack_name(&self, variant: ToolVariant, purpose: &str) -> String {
        format!("{variant}{DELIMITER}{}", self.stack_name(purpose))
    }

    /// CloudWatch log group of a per-tool compute stack
    pub fn log_group_name(&self, kind: ComputeKind, variant: ToolVariant) -> String {
        format!(
            "/aws/{kind}/{variant}-{environment}-{kind}-api",
            environment = self.environment
        )
    }
}

/// Alphanumeric identifier usable as a CloudFormation logical id
///
/// Every run of non-alphanumeric chars acts as a word boundary, words are capitalized.
pub fn logical_id(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();

            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect()
}

/// Check the name against CloudFormation stack name rules
pub fn validate_stack_name(name: &str) -> ComposeResult<()> {
    let reason = if name.len() > MAX_STACK_NAME_LENGTH {
        format!("longer than {MAX_STACK_NAME_LENGTH} characters")
    } else if !STACK_NAME.is_match(name) {
        "must start with a letter and contain only letters, digits and hyphens".to_string()
    } else {
        return Ok(());
    };

    Err(ComposeError::InvalidStackName {
        name: name.to_string(),
        reason,
    })
}
