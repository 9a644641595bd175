//! Stack composition for the CI/CD comparison sandbox.
//!
//! Turns context parameters into an [`Assembly`]: every stack the sandbox
//! consists of, how the stacks reference each other, and the order they
//! have to be deployed in.

pub mod assembly;
pub mod composer;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod naming;
pub mod stack;
pub mod variant;

pub use assembly::{Assembly, Manifest, StackManifest};
pub use composer::{compose, Composer, ComputeStacks};
pub use config::{Config, OidcConfig, PipelineConfig, Target};
pub use context::Context;
pub use error::{ComposeError, ComposeResult, ConfigError};
pub use graph::StackGraph;
pub use naming::{Naming, SERVICE_NAME};
pub use stack::{ComputeKind, Properties, Reference, Stack, StackKind};
pub use variant::{PerVariant, ToolVariant};
