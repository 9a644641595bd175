use common::context::keys;
use common::{
    compose, ComposeError, ComputeKind, ConfigError, Context, Naming, StackKind, Target,
    ToolVariant,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn pipeline_context() -> Context {
    Context::new()
        .with(keys::ENABLE_CODE_PIPELINE, "true")
        .with(keys::GITHUB_OWNER, "acme")
        .with(keys::GITHUB_REPO, "sandbox")
        .with(
            keys::GITHUB_CONNECTION_ARN,
            "arn:aws:codestar-connections:ap-northeast-1:123456789012:connection/abc",
        )
}

#[test]
fn naming_example() {
    let naming = Naming::new("local");
    assert_eq!(
        naming.resource_name("stack", "iam", None),
        "cicd-comparison-local-stack-iam"
    );
}

#[test]
fn one_stack_per_variant_and_kind() {
    let assembly = compose(&Context::new(), Target::default()).unwrap();

    for variant in ToolVariant::ALL {
        let stacks: Vec<_> = assembly.variant_stacks(variant).collect();
        assert_eq!(stacks.len(), 3);

        for kind in ComputeKind::ALL {
            let matching: Vec<_> = stacks
                .iter()
                .filter(|stack| stack.kind() == StackKind::from(kind))
                .collect();

            assert_eq!(matching.len(), 1, "{variant} {kind}");
            assert!(matching[0].name().starts_with(&format!("{variant}-")));
            assert_eq!(matching[0].port(), Some(variant.port()));
        }
    }

    let mut names: Vec<_> = assembly.stacks().iter().map(|s| s.name()).collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test_case(ToolVariant::GitHub, 8080)]
#[test_case(ToolVariant::GitLab, 8081)]
#[test_case(ToolVariant::CodePipeline, 8082)]
fn variant_ports(variant: ToolVariant, port: u16) {
    let assembly = compose(&Context::new(), Target::default()).unwrap();
    assert!(assembly
        .variant_stacks(variant)
        .all(|stack| stack.port() == Some(port)));
}

#[test]
fn order_respects_every_dependency() {
    let mut context = pipeline_context();
    context.set(keys::ENABLE_GITHUB_OIDC, "true");
    context.set(keys::GITHUB_ORG, "acme");

    let assembly = compose(&context, Target::default()).unwrap();
    let order: Vec<&str> = assembly.order().unwrap().iter().map(|s| s.name()).collect();

    assert_eq!(order.len(), assembly.stacks().len());

    for stack in assembly.stacks() {
        let position = order.iter().position(|n| *n == stack.name()).unwrap();

        for dependency in stack.dependencies() {
            let dep_position = order.iter().position(|n| *n == dependency.as_str()).unwrap();
            assert!(dep_position < position, "{dependency} before {}", stack.name());
        }
    }
}

#[test]
fn variants_are_independent() {
    let assembly = compose(&Context::new(), Target::default()).unwrap();

    for stack in assembly.stacks().iter().filter(|s| s.variant().is_some()) {
        for dependency in stack.dependencies() {
            let dependency = assembly.stack(dependency).unwrap();
            assert_eq!(dependency.variant(), None);
        }
    }
}

#[test]
fn waves_follow_the_graph() {
    let assembly = compose(&Context::new(), Target::default()).unwrap();
    let waves: Vec<Vec<&str>> = assembly
        .waves()
        .unwrap()
        .iter()
        .map(|wave| wave.iter().map(|s| s.name()).collect())
        .collect();

    assert_eq!(
        waves[0],
        vec![
            "cicd-comparison-local-stack-iam",
            "cicd-comparison-local-stack-network"
        ]
    );
    assert_eq!(waves[1].len(), 9);
    assert_eq!(waves[2], vec!["cicd-comparison-local-stack-monitoring"]);
}

#[test_case(None, true)]
#[test_case(Some("true"), true)]
#[test_case(Some("yes"), true)]
#[test_case(Some("false"), false)]
fn monitoring_inclusion(flag: Option<&str>, included: bool) {
    let mut context = Context::new();

    if let Some(flag) = flag {
        context.set(keys::ENABLE_MONITORING, flag);
    }

    let assembly = compose(&context, Target::default()).unwrap();
    let monitoring: Vec<_> = assembly.stacks_of_kind(StackKind::Monitoring).collect();

    if !included {
        assert!(monitoring.is_empty());
        return;
    }

    assert_eq!(monitoring.len(), 1);

    let dependencies = assembly
        .graph()
        .dependencies_of(monitoring[0].name())
        .unwrap();

    let compute: Vec<_> = assembly
        .stacks()
        .iter()
        .filter(|s| s.variant().is_some())
        .map(|s| s.name())
        .collect();

    assert_eq!(compute.len(), 9);
    assert!(compute.iter().all(|name| dependencies.contains(name)));
}

#[test_case(None)]
#[test_case(Some("TRUE"))]
#[test_case(Some("1"))]
#[test_case(Some("false"))]
fn pipeline_requires_exact_true(flag: Option<&str>) {
    let mut context = pipeline_context();

    match flag {
        Some(flag) => context.set(keys::ENABLE_CODE_PIPELINE, flag),
        None => context = Context::new(),
    }

    let assembly = compose(&context, Target::default()).unwrap();
    assert_eq!(assembly.stacks_of_kind(StackKind::Pipeline).count(), 0);
}

#[test]
fn pipeline_included_when_enabled() {
    let assembly = compose(&pipeline_context(), Target::default()).unwrap();
    assert_eq!(assembly.stacks_of_kind(StackKind::Pipeline).count(), 1);
}

#[test]
fn missing_owner_fails_before_composition() {
    let mut context = pipeline_context();
    context.set(keys::GITHUB_OWNER, "");

    assert_eq!(
        compose(&context, Target::default()).unwrap_err(),
        ComposeError::Config(ConfigError::MissingParameters {
            unit: "CodePipeline stack".into(),
            keys: vec!["githubOwner".into()],
        })
    );
}

#[test]
fn manifest_is_reproducible() {
    let target = Target::new(Some("123456789012"), Some("us-east-1")).unwrap();

    let first = compose(&pipeline_context(), target.clone())
        .unwrap()
        .manifest()
        .unwrap()
        .to_json()
        .unwrap();

    let second = compose(&pipeline_context(), target)
        .unwrap()
        .manifest()
        .unwrap()
        .to_json()
        .unwrap();

    assert_eq!(first, second);

    let json: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(json["account"], "123456789012");
    assert_eq!(json["region"], "us-east-1");
    assert_eq!(json["stacks"].as_array().unwrap().len(), 13);
}
