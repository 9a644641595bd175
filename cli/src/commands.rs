pub mod list;
pub mod name;
pub mod plan;
pub mod synth;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Compose all stacks and print the assembly manifest
    Synth(synth::SynthCommand),

    /// List stacks in deployment order
    List(list::ListCommand),

    /// Show deployment waves, stacks of one wave can be deployed in parallel
    Plan(plan::PlanCommand),

    /// Print a resource name following the naming convention
    Name(name::NameCommand),
}
