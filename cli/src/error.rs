use common::{ComposeError, ConfigError};

/// Display global error message in unified format
#[derive(Debug)]
pub struct Error(String, Option<String>);

impl Error {
    pub fn new(message: &str, details: Option<&str>) -> Self {
        Error(message.to_string(), details.map(|d| d.to_string()))
    }

    pub fn message(&self) -> &str {
        &self.0
    }

    pub fn details(&self) -> Option<&str> {
        self.1.as_deref()
    }

    /// Structured form for the JSON output mode
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.message(),
            "details": self.details(),
        })
    }
}

/// Display the message and details, as sort of a hint
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\n\n{}",
            self.0,
            console::style(self.1.clone().unwrap_or("".into())).dim()
        )
    }
}

/// Implement std::error::Error trait for Error
impl std::error::Error for Error {}

/// Convert eyre reports, keeping an Error wrapped into the report as is
impl From<eyre::ErrReport> for Error {
    fn from(error: eyre::ErrReport) -> Self {
        log::error!("{error:?}");

        error
            .downcast::<Error>()
            .unwrap_or_else(|err| Error::new(&format!("{err:#}"), None))
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        let hint = match &error {
            ConfigError::MissingParameters { .. } => {
                "Pass the parameters with --context key=value or set them in cicd-comparison.toml."
            }
            ConfigError::MalformedPair(_) => "Context parameters look like --context key=value.",
            _ => "Check the context parameters and the CDK_DEFAULT_* environment variables.",
        };

        Error::new(&format!("Invalid configuration: {error}"), Some(hint))
    }
}

impl From<ComposeError> for Error {
    fn from(error: ComposeError) -> Self {
        match error {
            ComposeError::Config(error) => error.into(),

            ComposeError::InvalidStackName { .. } => Error::new(
                &format!("Failed to compose stacks: {error}"),
                Some("The environment ends up in every stack name, use only letters, digits and hyphens."),
            ),

            other => Error::new(
                &format!("Failed to compose stacks: {other}"),
                Some("Run again with RUST_LOG=debug to see how the stacks were composed."),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_carry_a_hint() {
        let error: Error = ComposeError::Config(ConfigError::MissingParameters {
            unit: "CodePipeline stack".into(),
            keys: vec!["githubOwner".into()],
        })
        .into();

        assert!(error.message().starts_with("Invalid configuration"));
        assert!(error.message().contains("githubOwner"));
        assert!(error.details().unwrap().contains("--context"));
    }

    #[test]
    fn stack_name_errors_point_at_the_environment() {
        let error: Error = ComposeError::InvalidStackName {
            name: "cicd-comparison-my_env-stack-iam".into(),
            reason: "must match ^[A-Za-z][A-Za-z0-9-]*$".into(),
        }
        .into();

        assert!(error.message().contains("my_env"));
        assert!(error.details().unwrap().contains("hyphens"));
    }

    #[test]
    fn graph_errors_get_a_generic_hint() {
        let error: Error = ComposeError::StackNotFound { name: "iam".into() }.into();

        assert!(error.message().starts_with("Failed to compose stacks"));
        assert!(error.details().unwrap().contains("RUST_LOG"));
    }

    #[test]
    fn wrapped_error_survives_eyre() {
        let report = eyre::Report::new(Error::new("Output error", Some("hint")));
        let error: Error = report.into();

        assert_eq!(error.message(), "Output error");
        assert_eq!(error.details(), Some("hint"));
    }

    #[test]
    fn json_form() {
        let json = Error::new("Boom", None).to_json();
        assert_eq!(json["error"], "Boom");
        assert!(json["details"].is_null());
    }
}
