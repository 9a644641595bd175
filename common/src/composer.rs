use crate::assembly::Assembly;
use crate::config::{Config, OidcConfig, PipelineConfig, Target};
use crate::context::Context;
use crate::error::ComposeResult;
use crate::naming::{Naming, SERVICE_NAME};
use crate::stack::{
    outputs, ComputeKind, ComputeProps, IamProps, MonitoringProps, OidcProps, PipelineProps,
    Properties, Stack, StackKind,
};
use crate::variant::{PerVariant, ToolVariant};

pub const GITHUB_OIDC_PROVIDER_URL: &str = "https://token.actions.githubusercontent.com";
pub const GITHUB_OIDC_AUDIENCE: &str = "sts.amazonaws.com";

/// Validate the context and compose the full stack graph
///
/// Configuration errors are returned before any stack is constructed.
pub fn compose(context: &Context, target: Target) -> ComposeResult<Assembly> {
    let config = Config::from_context(context, target)?;
    Composer::new(config).compose()
}

/// The Lambda, ECS and EC2 stacks of one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeStacks {
    pub lambda: Stack,
    pub ecs: Stack,
    pub ec2: Stack,
}

impl ComputeStacks {
    pub fn get(&self, kind: ComputeKind) -> &Stack {
        match kind {
            ComputeKind::Lambda => &self.lambda,
            ComputeKind::Ecs => &self.ecs,
            ComputeKind::Ec2 => &self.ec2,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stack> {
        ComputeKind::ALL.into_iter().map(move |kind| self.get(kind))
    }
}

/// Builds the stacks from a validated config, top to bottom
pub struct Composer {
    config: Config,
    naming: Naming,
}

impl Composer {
    pub fn new(config: Config) -> Self {
        let naming = config.naming();
        Self { config, naming }
    }

    pub fn compose(&self) -> ComposeResult<Assembly> {
        let mut assembly = Assembly::new(self.naming.clone(), self.config.target.clone());

        // Roles and the VPC are consumed by everything below
        let iam = assembly.add(self.iam())?.clone();
        let network = assembly.add(self.network())?.clone();

        let compute = PerVariant::try_from_fn(|variant| {
            self.compute(&mut assembly, variant, &iam, &network)
        })?;

        if let Some(pipeline) = &self.config.pipeline {
            assembly.add(self.pipeline(pipeline, &iam)?)?;
        }

        if let Some(oidc) = &self.config.oidc {
            assembly.add(self.oidc(oidc, &iam)?)?;
        }

        if self.config.monitoring {
            assembly.add(self.monitoring(&compute)?)?;
        }

        log::debug!(
            "Composed {} stacks with {} dependencies for {}",
            assembly.stacks().len(),
            assembly.graph().edge_count(),
            self.naming.environment(),
        );

        Ok(assembly)
    }

    /// Common tags, plus the tool tag for per-tool stacks
    fn tagged(&self, stack: Stack) -> Stack {
        let variant = stack.variant();

        let stack = stack
            .with_tag("Project", self.naming.service_name())
            .with_tag("Environment", self.naming.environment())
            .with_tag("ManagedBy", SERVICE_NAME);

        match variant {
            Some(variant) => stack.with_tag("CicdTool", variant.as_str()),
            None => stack,
        }
    }

    fn iam(&self) -> Stack {
        let roles = outputs::IAM_ROLES
            .iter()
            .map(|key| {
                let name = self.naming.resource_name("role", &role_purpose(key), None);
                (key.to_string(), name)
            })
            .collect();

        let stack = outputs::IAM_ROLES.iter().fold(
            Stack::new(
                &self.naming.stack_name(StackKind::Iam.purpose()),
                StackKind::Iam,
                "IAM roles and policies for CI/CD comparison project",
            ),
            |stack, key| stack.with_output(key),
        );

        self.tagged(stack.with_properties(Properties::Iam(IamProps { roles })))
    }

    fn network(&self) -> Stack {
        let stack = Stack::new(
            &self.naming.stack_name(StackKind::Network.purpose()),
            StackKind::Network,
            "Network infrastructure for CI/CD comparison project",
        )
        .with_output(outputs::VPC)
        .with_output(outputs::PRIVATE_SUBNETS)
        .with_output(outputs::PUBLIC_SUBNETS);

        self.tagged(stack)
    }

    /// Lambda, ECS and EC2 stacks of one tool
    ///
    /// They only depend on the shared IAM and network stacks, never on another tool.
    fn compute(
        &self,
        assembly: &mut Assembly,
        variant: ToolVariant,
        iam: &Stack,
        network: &Stack,
    ) -> ComposeResult<ComputeStacks> {
        let mut build = |kind: ComputeKind| -> ComposeResult<Stack> {
            let roles = kind
                .roles()
                .iter()
                .map(|role| iam.reference(role))
                .collect::<ComposeResult<Vec<_>>>()?;

            let props = ComputeProps {
                port: variant.port(),
                vpc: network.reference(outputs::VPC)?,
                roles,
                log_group: self.naming.log_group_name(kind, variant),
            };

            let stack = Stack::new(
                &self.naming.variant_stack_name(variant, kind.as_str()),
                kind.into(),
                &kind.description(variant),
            )
            .with_variant(variant)
            .depends_on(network.name())
            .depends_on(iam.name())
            .with_output(outputs::LOG_GROUP)
            .with_output(outputs::ENDPOINT)
            .with_properties(Properties::Compute(props));

            Ok(assembly.add(self.tagged(stack))?.clone())
        };

        Ok(ComputeStacks {
            lambda: build(ComputeKind::Lambda)?,
            ecs: build(ComputeKind::Ecs)?,
            ec2: build(ComputeKind::Ec2)?,
        })
    }

    fn pipeline(&self, config: &PipelineConfig, iam: &Stack) -> ComposeResult<Stack> {
        let props = PipelineProps {
            pipeline_name: self.naming.resource_name("pipeline", "deploy", None),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            connection_arn: config.connection_arn.clone(),
            role: iam.reference(outputs::CODE_PIPELINE_ROLE)?,
        };

        let stack = Stack::new(
            &self.naming.stack_name(StackKind::Pipeline.purpose()),
            StackKind::Pipeline,
            "CodePipeline deployment pipeline for CI/CD comparison project",
        )
        .depends_on(iam.name())
        .with_output(outputs::PIPELINE_NAME)
        .with_properties(Properties::Pipeline(props));

        Ok(self.tagged(stack))
    }

    fn oidc(&self, config: &OidcConfig, iam: &Stack) -> ComposeResult<Stack> {
        let props = OidcProps {
            provider_url: GITHUB_OIDC_PROVIDER_URL.to_string(),
            audience: GITHUB_OIDC_AUDIENCE.to_string(),
            subject: config.subject(),
            role: iam.reference(outputs::GITHUB_ACTIONS_ROLE)?,
        };

        let stack = Stack::new(
            &self.naming.stack_name(StackKind::GitHubOidc.purpose()),
            StackKind::GitHubOidc,
            "GitHub Actions OIDC federation for CI/CD comparison project",
        )
        .depends_on(iam.name())
        .with_output(outputs::OIDC_PROVIDER)
        .with_properties(Properties::GitHubOidc(props));

        Ok(self.tagged(stack))
    }

    /// Dashboard and alarms over every compute stack's log group
    fn monitoring(&self, compute: &PerVariant<ComputeStacks>) -> ComposeResult<Stack> {
        let watched: Vec<&Stack> = compute
            .iter()
            .flat_map(|(_, stacks)| stacks.iter())
            .collect();

        let log_groups = watched
            .iter()
            .map(|stack| stack.reference(outputs::LOG_GROUP))
            .collect::<ComposeResult<Vec<_>>>()?;

        let props = MonitoringProps {
            dashboard_name: self.naming.resource_name("dashboard", "overview", None),
            alarm_topic_name: self.naming.resource_name("topic", "alarms", None),
            log_groups,
        };

        let stack = watched.iter().fold(
            Stack::new(
                &self.naming.stack_name(StackKind::Monitoring.purpose()),
                StackKind::Monitoring,
                "CloudWatch monitoring for CI/CD comparison project",
            ),
            |stack, watched| stack.depends_on(watched.name()),
        );

        Ok(self.tagged(
            stack
                .with_output(outputs::DASHBOARD)
                .with_output(outputs::ALARM_TOPIC)
                .with_properties(Properties::Monitoring(props)),
        ))
    }
}

/// `lambdaExecutionRole` -> `lambda-execution`
fn role_purpose(output: &str) -> String {
    let mut purpose = String::with_capacity(output.len() + 4);

    for c in output.strip_suffix("Role").unwrap_or(output).chars() {
        if c.is_ascii_uppercase() {
            purpose.push('-');
            purpose.push(c.to_ascii_lowercase());
        } else {
            purpose.push(c);
        }
    }

    purpose
}
