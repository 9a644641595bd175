use crate::config::Global;
use crate::error::Error;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use common::config::DEFAULT_ENVIRONMENT;
use common::context::keys;
use common::naming::DELIMITER;
use common::{Naming, ToolVariant};
use serde_json::json;

#[derive(clap::Args, Clone)]
pub(crate) struct NameCommand {
    /// Resource type, e.g. stack, role, bucket
    resource_type: String,

    /// What the resource is for, e.g. iam
    purpose: String,

    /// Sequence number, for resources of the same type and purpose
    sequence: Option<u32>,

    /// Prefix with a CI/CD tool (github, gitlab, codepipeline)
    #[arg(short, long)]
    tool: Option<ToolVariant>,
}

impl NameCommand {
    fn name(&self, environment: &str) -> String {
        let name = Naming::new(environment).resource_name(
            &self.resource_type,
            &self.purpose,
            self.sequence,
        );

        match self.tool {
            Some(tool) => format!("{tool}{DELIMITER}{name}"),
            None => name,
        }
    }
}

impl Runnable for NameCommand {
    fn runner<'a>(&self, global: &'a Global, writer: &'a Writer) -> impl Runner + 'a {
        NameRunner {
            command: self.clone(),
            global,
            writer,
        }
    }
}

struct NameRunner<'a> {
    command: NameCommand,
    global: &'a Global,
    writer: &'a Writer,
}

impl Runner for NameRunner<'_> {
    /// Only the environment is resolved, optional stacks are not validated
    fn run(&mut self) -> Result<(), Error> {
        let context = self.context(self.global)?;
        let name = self
            .command
            .name(context.get_or(keys::ENVIRONMENT, DEFAULT_ENVIRONMENT));

        if self.writer.is_structured() {
            return self.writer.json(&json!({ "name": name }));
        }

        self.writer.text(&format!("{name}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(sequence: Option<u32>, tool: Option<ToolVariant>) -> NameCommand {
        NameCommand {
            resource_type: "stack".into(),
            purpose: "iam".into(),
            sequence,
            tool,
        }
    }

    #[test]
    fn plain_name() {
        assert_eq!(
            command(None, None).name("local"),
            "cicd-comparison-local-stack-iam"
        );
    }

    #[test]
    fn environment_comes_from_context() {
        let dir = tempfile::tempdir().unwrap();
        let global = Global::with_context_file(dir.path(), "environment = \"staging\"", true);
        let writer = Writer::capturing(true);

        command(None, Some(ToolVariant::GitHub))
            .runner(&global, &writer)
            .run()
            .unwrap();

        assert_eq!(
            writer.captured_output(),
            "{\"name\":\"github-cicd-comparison-staging-stack-iam\"}\n"
        );
    }

    #[test]
    fn tool_prefix_and_sequence() {
        assert_eq!(
            command(Some(3), Some(ToolVariant::GitLab)).name("prod"),
            "gitlab-cicd-comparison-prod-stack-iam-3"
        );
    }
}
