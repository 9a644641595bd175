use thiserror::Error;

/// Invalid or incomplete context parameters
///
/// Raised before any stack is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An optional stack is enabled but some of its parameters are not set
    #[error("{unit} is enabled but context parameters are missing: {}", .keys.join(", "))]
    MissingParameters { unit: String, keys: Vec<String> },

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("malformed context parameter {0:?}, expected key=value")]
    MalformedPair(String),

    #[error("unknown CI/CD tool {0:?}, expected one of github, gitlab, codepipeline")]
    UnknownVariant(String),
}

impl ConfigError {
    /// Merge two failures of separate stacks into one error
    ///
    /// Missing parameters are merged, otherwise missing parameters take precedence.
    pub(crate) fn combine(self, other: ConfigError) -> ConfigError {
        match (self, other) {
            (
                ConfigError::MissingParameters { unit, mut keys },
                ConfigError::MissingParameters {
                    unit: other_unit,
                    keys: other_keys,
                },
            ) => {
                for key in other_keys {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }

                ConfigError::MissingParameters {
                    unit: format!("{unit} and {other_unit}"),
                    keys,
                }
            }

            (missing @ ConfigError::MissingParameters { .. }, _)
            | (_, missing @ ConfigError::MissingParameters { .. }) => missing,

            (first, _) => first,
        }
    }
}

/// Failures while building the stack graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("stack {name} is defined more than once")]
    DuplicateStack { name: String },

    #[error("stack not found: {name}")]
    StackNotFound { name: String },

    #[error("stack {stack} has no output {output}")]
    OutputNotFound { stack: String, output: String },

    /// The path starts and ends with the same stack
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("invalid stack name {name:?}: {reason}")]
    InvalidStackName { name: String, reason: String },
}

pub type ComposeResult<T> = Result<T, ComposeError>;
