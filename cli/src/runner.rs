use crate::config::Global;
use crate::error::Error;
use crate::writer::Writer;
use common::{compose, Assembly, Context};

pub(crate) trait Runner {
    /// Context parameters of the current invocation
    fn context(&self, global: &Global) -> Result<Context, Error> {
        Ok(global.context()?)
    }

    /// Compose all stacks for the current invocation
    ///
    /// Fails with a user-facing message when the configuration is incomplete.
    fn assembly(&self, global: &Global) -> Result<Assembly, Error> {
        let context = self.context(global)?;
        let target = global.target()?;

        compose(&context, target).map_err(|e| {
            log::error!("{e:?}");
            e.into()
        })
    }

    /// Run the command
    ///
    /// Returns an error shown to the user in case of failure
    fn run(&mut self) -> Result<(), Error>;
}

/// Return a runner for a command
pub(crate) trait Runnable {
    fn runner<'a>(&self, global: &'a Global, writer: &'a Writer) -> impl Runner + 'a;
}
