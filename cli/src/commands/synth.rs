use crate::config::Global;
use crate::error::Error;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use eyre::WrapErr;
use std::fs;
use std::path::PathBuf;

#[derive(clap::Args, Clone)]
pub(crate) struct SynthCommand {
    /// Also write the manifest as pretty JSON to the file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Runnable for SynthCommand {
    fn runner<'a>(&self, global: &'a Global, writer: &'a Writer) -> impl Runner + 'a {
        SynthRunner {
            command: self.clone(),
            global,
            writer,
        }
    }
}

struct SynthRunner<'a> {
    command: SynthCommand,
    global: &'a Global,
    writer: &'a Writer,
}

impl Runner for SynthRunner<'_> {
    /// Compose the stacks and print the manifest, or a summary of it
    fn run(&mut self) -> Result<(), Error> {
        let assembly = self.assembly(self.global)?;
        let manifest = assembly.manifest()?;

        if let Some(path) = &self.command.output {
            let json = manifest
                .to_json()
                .wrap_err("Failed to serialize the manifest")?;

            fs::write(path, format!("{json}\n"))
                .inspect_err(|e| log::error!("Failed to write {path:?}: {e:?}"))
                .wrap_err(Error::new(
                    "Failed to write the manifest",
                    Some("Check file system permissions."),
                ))?;
        }

        if self.writer.is_structured() {
            return self.writer.json(&manifest);
        }

        self.writer.text(&format!(
            "{} {} stacks for {} in {}\n\n",
            console::style("Synthesized").green().bold(),
            manifest.stacks.len(),
            console::style(&manifest.environment).bold(),
            manifest.region,
        ))?;

        for stack in &manifest.stacks {
            let kind = match stack.variant {
                Some(variant) => format!("{} {variant}", stack.kind),
                None => stack.kind.to_string(),
            };

            self.writer.text(&format!(
                "    {} {}\n",
                console::style(&stack.name).bold(),
                console::style(kind).dim(),
            ))?;
        }

        if let Some(path) = &self.command.output {
            self.writer.text(&format!(
                "\n{}\n{}\n",
                console::style("Manifest written to").dim(),
                console::style(path.to_string_lossy()).bold().underlined(),
            ))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PIPELINE: &str = r#"
environment = "prod"
enableCodePipeline = true
githubOwner = "acme"
githubRepo = "sandbox"
githubConnectionArn = "arn:aws:codestar-connections:ap-northeast-1:123456789012:connection/abc"
"#;

    #[test]
    fn writes_pretty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let global = Global::with_context_file(dir.path(), PIPELINE, false);
        let writer = Writer::capturing(false);

        let command = SynthCommand {
            output: Some(path.clone()),
        };

        command.runner(&global, &writer).run().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{\n  \"service\": \"cicd-comparison\""));
        assert!(written.ends_with("}\n"));

        let manifest: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(manifest["environment"], "prod");
        assert_eq!(manifest["stacks"].as_array().unwrap().len(), 13);
        assert_eq!(manifest["order"][0], "cicd-comparison-prod-stack-iam");

        let output = writer.captured_output();
        assert!(output.contains("13 stacks for"));
        assert!(output.contains("cicd-comparison-prod-stack-pipeline"));
        assert!(output.contains("Manifest written to"));
    }

    #[test]
    fn prints_manifest_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let global = Global::with_context_file(dir.path(), "enableMonitoring = false", true);
        let writer = Writer::capturing(true);

        SynthCommand { output: None }
            .runner(&global, &writer)
            .run()
            .unwrap();

        let manifest: serde_json::Value =
            serde_json::from_str(&writer.captured_output()).unwrap();

        assert_eq!(manifest["region"], "ap-northeast-1");
        assert_eq!(manifest["stacks"].as_array().unwrap().len(), 11);
        assert_eq!(manifest["waves"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn nothing_is_written_on_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let global = Global::with_context_file(dir.path(), "enableGitHubOidc = true", false);
        let writer = Writer::capturing(false);

        let error = SynthCommand {
            output: Some(path.clone()),
        }
        .runner(&global, &writer)
        .run()
        .unwrap_err();

        assert!(error.message().contains("githubOrg"));
        assert!(error.details().unwrap().contains("--context"));
        assert!(!path.exists());
    }
}
