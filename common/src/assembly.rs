use crate::config::Target;
use crate::error::{ComposeError, ComposeResult};
use crate::graph::StackGraph;
use crate::naming::{validate_stack_name, Naming};
use crate::stack::{Properties, Stack, StackKind};
use crate::variant::ToolVariant;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of a composition pass
///
/// Stacks keep their creation order. Every dependency of a stack was added before it.
#[derive(Debug, Clone)]
pub struct Assembly {
    naming: Naming,
    target: Target,
    stacks: Vec<Stack>,
    graph: StackGraph,
}

impl Assembly {
    pub(crate) fn new(naming: Naming, target: Target) -> Self {
        Self {
            naming,
            target,
            stacks: vec![],
            graph: StackGraph::new(),
        }
    }

    /// Register a stack and its dependency edges
    ///
    /// Nothing is registered when the stack is rejected.
    pub(crate) fn add(&mut self, stack: Stack) -> ComposeResult<&Stack> {
        validate_stack_name(stack.name())?;

        if self.graph.contains(stack.name()) {
            return Err(ComposeError::DuplicateStack {
                name: stack.name().to_string(),
            });
        }

        for dependency in stack.dependencies() {
            if dependency == stack.name() {
                return Err(ComposeError::DependencyCycle {
                    path: vec![dependency.clone(), dependency.clone()],
                });
            }

            if !self.graph.contains(dependency) {
                return Err(ComposeError::StackNotFound {
                    name: dependency.clone(),
                });
            }
        }

        self.graph.add_stack(stack.name())?;

        for dependency in stack.dependencies() {
            self.graph.add_dependency(dependency, stack.name())?;
        }

        log::debug!(
            "Added stack {} ({}), depends on [{}]",
            stack.name(),
            stack.kind(),
            stack.dependencies().join(", ")
        );

        self.stacks.push(stack);
        Ok(&self.stacks[self.stacks.len() - 1])
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn graph(&self) -> &StackGraph {
        &self.graph
    }

    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|stack| stack.name() == name)
    }

    pub fn stacks_of_kind(&self, kind: StackKind) -> impl Iterator<Item = &Stack> {
        self.stacks.iter().filter(move |stack| stack.kind() == kind)
    }

    pub fn variant_stacks(&self, variant: ToolVariant) -> impl Iterator<Item = &Stack> {
        self.stacks
            .iter()
            .filter(move |stack| stack.variant() == Some(variant))
    }

    /// Stacks in deployment order
    pub fn order(&self) -> ComposeResult<Vec<&Stack>> {
        self.graph
            .topological_order()?
            .iter()
            .map(|name| self.lookup(name))
            .collect()
    }

    /// Groups of stacks that can be deployed in parallel, one group after another
    pub fn waves(&self) -> ComposeResult<Vec<Vec<&Stack>>> {
        self.graph
            .waves()?
            .iter()
            .map(|wave| {
                wave.iter()
                    .map(|name| self.lookup(name))
                    .collect::<ComposeResult<Vec<_>>>()
            })
            .collect()
    }

    pub fn manifest(&self) -> ComposeResult<Manifest> {
        let stacks = self
            .stacks
            .iter()
            .map(|stack| StackManifest {
                name: stack.name().to_string(),
                logical_id: stack.logical_id(),
                kind: stack.kind(),
                variant: stack.variant(),
                description: stack.description().to_string(),
                dependencies: stack.dependencies().to_vec(),
                outputs: stack
                    .outputs()
                    .iter()
                    .map(|(key, reference)| (key.clone(), reference.export_name()))
                    .collect(),
                tags: stack.tags().clone(),
                properties: stack.properties().clone(),
            })
            .collect();

        Ok(Manifest {
            service: self.naming.service_name().to_string(),
            environment: self.naming.environment().to_string(),
            account: self.target.account.clone(),
            region: self.target.region.clone(),
            stacks,
            order: self.graph.topological_order()?,
            waves: self.graph.waves()?,
        })
    }

    fn lookup(&self, name: &str) -> ComposeResult<&Stack> {
        self.stack(name).ok_or_else(|| ComposeError::StackNotFound {
            name: name.to_string(),
        })
    }
}

/// Serializable description of an assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub service: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub region: String,
    pub stacks: Vec<StackManifest>,
    pub order: Vec<String>,
    pub waves: Vec<Vec<String>>,
}

impl Manifest {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackManifest {
    pub name: String,
    pub logical_id: String,
    pub kind: StackKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<ToolVariant>,
    pub description: String,
    pub dependencies: Vec<String>,
    /// Output key to export name
    pub outputs: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Properties::is_none")]
    pub properties: Properties,
}
