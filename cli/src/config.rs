pub(crate) mod context_file;

use common::{Context, Target};
use context_file::ContextFile;
use eyre::WrapErr;
use std::path::PathBuf;

/// Options shared by all commands
#[derive(clap::Args, Clone, Debug, Default)]
pub(crate) struct Global {
    /// Print structured JSON instead of plain text
    #[arg(long, global = true)]
    pub(crate) json: bool,

    /// Path to the context file [default: ./cicd-comparison.toml]
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Context parameter, overrides the context file, e.g. -c environment=prod
    #[arg(short = 'c', long = "context", global = true, value_parser = parse_context_pair)]
    pub(crate) context: Vec<(String, String)>,

    /// Target AWS account
    #[arg(long, global = true, env = "CDK_DEFAULT_ACCOUNT")]
    pub(crate) account: Option<String>,

    /// Target AWS region [default: ap-northeast-1]
    #[arg(long, global = true, env = "CDK_DEFAULT_REGION")]
    pub(crate) region: Option<String>,
}

impl Global {
    /// Context file values overlaid with the --context flags
    pub(crate) fn context(&self) -> eyre::Result<Context> {
        let mut context = match &self.config {
            Some(path) => ContextFile::from_path(path)?,
            None => ContextFile::from_dir(&std::env::current_dir().wrap_err("No working dir")?)?,
        };

        context.merge(self.context.iter().cloned().collect());

        log::debug!(
            "Context: {}",
            context
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(context)
    }

    pub(crate) fn target(&self) -> Result<Target, common::ConfigError> {
        Target::new(self.account.as_deref(), self.region.as_deref())
    }
}

#[cfg(test)]
impl Global {
    /// Options of a command run with the given `[context]` table written to a file in `dir`
    pub(crate) fn with_context_file(dir: &std::path::Path, context: &str, json: bool) -> Self {
        let path = dir.join(context_file::CONTEXT_FILE_NAME);
        std::fs::write(&path, format!("[context]\n{context}\n")).unwrap();

        Global {
            json,
            config: Some(path),
            ..Default::default()
        }
    }
}

fn parse_context_pair(pair: &str) -> Result<(String, String), common::ConfigError> {
    Context::parse_pair(pair)
}
