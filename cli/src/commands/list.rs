use crate::config::Global;
use crate::error::Error;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use common::{Stack, StackKind, ToolVariant};
use serde::Serialize;
use tabled::settings::{peaker::Priority, style::Style, Settings, Width};
use tabled::{Table, Tabled};
use terminal_size::{terminal_size, Width as TerminalWidth};

/// Used when stdout is not a terminal
const DEFAULT_WIDTH: usize = 160;

#[derive(Tabled, Clone)]
struct StackRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Stack")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Tool")]
    tool: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Depends On")]
    dependencies: String,
}

impl StackRow {
    fn new(position: usize, stack: &Stack) -> Self {
        Self {
            position,
            name: stack.name().to_string(),
            kind: stack.kind().to_string(),
            tool: stack.variant().map(|v| v.to_string()).unwrap_or_default(),
            port: stack.port().map(|p| p.to_string()).unwrap_or_default(),
            dependencies: stack.dependencies().join("\n"),
        }
    }
}

/// A stack in the structured output
#[derive(Serialize)]
struct ListedStack<'a> {
    name: &'a str,
    kind: StackKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant: Option<ToolVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    dependencies: &'a [String],
}

impl<'a> From<&'a Stack> for ListedStack<'a> {
    fn from(stack: &'a Stack) -> Self {
        Self {
            name: stack.name(),
            kind: stack.kind(),
            variant: stack.variant(),
            port: stack.port(),
            dependencies: stack.dependencies(),
        }
    }
}

#[derive(Serialize)]
struct StackList<'a> {
    stacks: Vec<ListedStack<'a>>,
}

#[derive(clap::Args, Clone)]
pub(crate) struct ListCommand;

impl Runnable for ListCommand {
    fn runner<'a>(&self, global: &'a Global, writer: &'a Writer) -> impl Runner + 'a {
        ListRunner { global, writer }
    }
}

struct ListRunner<'a> {
    global: &'a Global,
    writer: &'a Writer,
}

impl Runner for ListRunner<'_> {
    /// Prints out all stacks in the order they have to be deployed
    fn run(&mut self) -> Result<(), Error> {
        let assembly = self.assembly(self.global)?;
        let order = assembly.order()?;

        if self.writer.is_structured() {
            let list = StackList {
                stacks: order.iter().map(|stack| ListedStack::from(*stack)).collect(),
            };

            return self.writer.json(&list);
        }

        let rows: Vec<StackRow> = order
            .iter()
            .enumerate()
            .map(|(i, stack)| StackRow::new(i + 1, stack))
            .collect();

        let width = terminal_size()
            .map(|(TerminalWidth(width), _)| width as usize)
            .unwrap_or(DEFAULT_WIDTH);

        let settings = Settings::default().with(Width::wrap(width).priority(Priority::max(true)));

        let mut table = Table::new(rows);
        table.with(Style::modern()).with(settings);

        self.writer.text(&format!(
            "{} {}\n{table}\n",
            console::style("Stacks for").green().bold(),
            console::style(assembly.naming().environment()).bold(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(context: &str, is_structured: bool) -> String {
        let dir = tempfile::tempdir().unwrap();
        let global = Global::with_context_file(dir.path(), context, is_structured);
        let writer = Writer::capturing(is_structured);

        ListCommand.runner(&global, &writer).run().unwrap();
        writer.captured_output()
    }

    #[test]
    fn stacks_as_json_in_deployment_order() {
        let json: serde_json::Value =
            serde_json::from_str(&list("environment = \"staging\"", true)).unwrap();
        let stacks = json["stacks"].as_array().unwrap();

        assert_eq!(stacks.len(), 12);
        assert_eq!(stacks[0]["name"], "cicd-comparison-staging-stack-iam");
        assert_eq!(stacks[0]["kind"], "iam");
        assert!(stacks[0].get("port").is_none());
        assert_eq!(stacks[11]["kind"], "monitoring");

        let ecs = stacks
            .iter()
            .find(|stack| stack["name"] == "codepipeline-cicd-comparison-staging-stack-ecs")
            .unwrap();

        assert_eq!(ecs["variant"], "codepipeline");
        assert_eq!(ecs["port"], 8082);
        assert_eq!(
            ecs["dependencies"],
            serde_json::json!([
                "cicd-comparison-staging-stack-network",
                "cicd-comparison-staging-stack-iam"
            ])
        );
    }

    #[test]
    fn stacks_as_table() {
        let output = list("enableMonitoring = false", false);

        assert!(output.contains("Stacks for"));
        assert!(output.contains("github-cicd-comparison-local-stack-lambda"));
        assert!(!output.contains("cicd-comparison-local-stack-monitoring"));
    }
}
