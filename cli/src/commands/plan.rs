use crate::config::Global;
use crate::error::Error;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use common::Stack;
use serde::Serialize;

#[derive(clap::Args, Clone)]
pub(crate) struct PlanCommand;

/// Stack names grouped by deployment wave
#[derive(Serialize)]
struct Plan<'a> {
    waves: Vec<Vec<&'a str>>,
}

impl Runnable for PlanCommand {
    fn runner<'a>(&self, global: &'a Global, writer: &'a Writer) -> impl Runner + 'a {
        PlanRunner { global, writer }
    }
}

struct PlanRunner<'a> {
    global: &'a Global,
    writer: &'a Writer,
}

impl Runner for PlanRunner<'_> {
    /// Prints deployment waves, one after another
    fn run(&mut self) -> Result<(), Error> {
        let assembly = self.assembly(self.global)?;
        let waves = assembly.waves()?;

        if self.writer.is_structured() {
            let plan = Plan {
                waves: waves
                    .iter()
                    .map(|wave| wave.iter().map(|stack| stack.name()).collect())
                    .collect(),
            };

            return self.writer.json(&plan);
        }

        for (i, wave) in waves.iter().enumerate() {
            self.writer.text(&format!(
                "{} {}\n",
                console::style(format!("Wave {}", i + 1)).bold(),
                console::style(format!("({} in parallel)", wave.len())).dim(),
            ))?;

            for stack in wave {
                self.writer.text(&format!("    {}\n", describe(stack)))?;
            }

            self.writer.text("\n")?;
        }

        Ok(())
    }
}

fn describe(stack: &Stack) -> String {
    match stack.port() {
        Some(port) => format!("{} {}", stack.name(), console::style(format!(":{port}")).dim()),
        None => stack.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plan(context: &str, is_structured: bool) -> (Result<(), Error>, String) {
        let dir = tempfile::tempdir().unwrap();
        let global = Global::with_context_file(dir.path(), context, is_structured);
        let writer = Writer::capturing(is_structured);

        let result = PlanCommand.runner(&global, &writer).run();
        (result, writer.captured_output())
    }

    #[test]
    fn waves_as_json() {
        let (result, output) = plan("", true);
        result.unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        let waves = json["waves"].as_array().unwrap();

        assert_eq!(waves.len(), 3);
        assert_eq!(
            waves[0],
            serde_json::json!([
                "cicd-comparison-local-stack-iam",
                "cicd-comparison-local-stack-network"
            ])
        );
        assert_eq!(waves[1].as_array().unwrap().len(), 9);
        assert_eq!(
            waves[2],
            serde_json::json!(["cicd-comparison-local-stack-monitoring"])
        );
    }

    #[test]
    fn waves_as_text() {
        let (result, output) = plan("enableMonitoring = \"false\"", false);
        result.unwrap();

        assert!(output.contains("Wave 1"));
        assert!(output.contains("Wave 2"));
        assert!(!output.contains("Wave 3"));
        assert!(output.contains("gitlab-cicd-comparison-local-stack-ecs"));
        assert!(output.contains(":8081"));
    }

    #[test]
    fn compose_errors_carry_a_hint() {
        let (result, output) = plan("enableCodePipeline = \"true\"", true);
        let error = result.unwrap_err();

        assert!(error.message().contains("githubConnectionArn"));
        assert!(error.details().is_some());
        assert_eq!(output, "");
    }
}
