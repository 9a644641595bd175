mod commands;
mod config;
mod error;
mod logger;
mod runner;
mod writer;

use crate::commands::Commands;
use crate::config::Global;
use crate::error::Error;
use crate::logger::Logger;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use clap::Parser;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

/// Derive a runner from the command and run it
fn run(command: &impl Runnable, global: &Global, writer: &Writer) -> Result<(), Error> {
    command.runner(global, writer).run()
}

fn main() {
    Logger::init();

    let cli = Cli::parse();
    let writer = Writer::new(cli.global.json);

    // Match all commands here, in one place
    let result = match &cli.command {
        Commands::Synth(cmd) => run(cmd, &cli.global, &writer),
        Commands::List(cmd) => run(cmd, &cli.global, &writer),
        Commands::Plan(cmd) => run(cmd, &cli.global, &writer),
        Commands::Name(cmd) => run(cmd, &cli.global, &writer),
    };

    if let Err(error) = result {
        report(&error, &writer);

        // The Error should be used as a terminating error
        std::process::exit(1)
    }
}

/// Show a terminating error, as JSON in structured mode
fn report(error: &Error, writer: &Writer) {
    let shown = if writer.is_structured() {
        writer.json(&error.to_json())
    } else {
        writer.error(&format!(
            "\n{}\n{error}\n",
            console::style("Error").red().bold()
        ))
    };

    if shown.is_err() {
        eprintln!("{error}");
    }
}
