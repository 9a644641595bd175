use crate::error::Error;
use common::Context;
use eyre::WrapErr;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub(crate) const CONTEXT_FILE_NAME: &str = "cicd-comparison.toml";

/// The structure of cicd-comparison.toml
///
/// [context]
/// environment = "staging"
/// enableCodePipeline = true
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ContextFile {
    #[serde(default)]
    context: BTreeMap<String, toml::Value>,
}

impl ContextFile {
    /// Read the context file from the directory
    ///
    /// A missing file is an empty context.
    pub(crate) fn from_dir(dir: &Path) -> eyre::Result<Context> {
        let path = dir.join(CONTEXT_FILE_NAME);

        if !path.exists() {
            log::debug!("No {CONTEXT_FILE_NAME} in {dir:?}, using empty context");
            return Ok(Context::default());
        }

        Self::from_path(&path)
    }

    /// Read an explicitly requested context file, it must exist
    pub(crate) fn from_path(path: &Path) -> eyre::Result<Context> {
        let toml_string = fs::read_to_string(path)
            .inspect_err(|e| log::error!("Failed to read {path:?}: {e:?}"))
            .wrap_err(Error::new(
                &format!("Failed to read context file {}", path.to_string_lossy()),
                Some("Check the path passed with --config."),
            ))?;

        Self::parse(&toml_string)
            .wrap_err(format!("Failed to parse {}", path.to_string_lossy()))
    }

    fn parse(toml_string: &str) -> eyre::Result<Context> {
        let file: ContextFile = toml::from_str(toml_string)?;
        let mut context = Context::new();

        for (key, value) in file.context {
            let value = match value {
                toml::Value::String(value) => value,
                toml::Value::Boolean(value) => value.to_string(),
                toml::Value::Integer(value) => value.to_string(),
                toml::Value::Float(value) => value.to_string(),
                other => {
                    return Err(eyre::eyre!(
                        "Unsupported value for {key}: {}, use a string, boolean or number",
                        other.type_str()
                    ))
                }
            };

            context.set(&key, &value);
        }

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalar_values_become_strings() {
        let context = ContextFile::parse(
            r#"
            [context]
            environment = "prod"
            enableCodePipeline = true
            enableMonitoring = false
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(context.get("environment"), Some("prod"));
        assert!(context.is_enabled("enableCodePipeline"));
        assert!(context.is_disabled("enableMonitoring"));
        assert_eq!(context.get("port"), Some("8080"));
    }

    #[test]
    fn nested_values_are_rejected() {
        let error = ContextFile::parse("[context]\ngithub = { owner = \"acme\" }\n").unwrap_err();
        assert!(error.to_string().contains("github"));
    }

    #[test]
    fn missing_section_is_empty() {
        assert!(ContextFile::parse("").unwrap().is_empty());
    }

    #[test]
    fn missing_default_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ContextFile::from_dir(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let error = ContextFile::from_path(&dir.path().join("nope.toml")).unwrap_err();
        let error: Error = error.into();

        assert!(error.message().starts_with("Failed to read context file"));
    }
}
