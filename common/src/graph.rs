//! Stack dependency graph.
//!
//! An edge `A -> B` means B depends on A, so A has to be deployed first.
//! Cycles are rejected when the edge is inserted, which keeps the graph a DAG
//! at all times. Ordering is deterministic: ties are broken by stack name.

use crate::error::{ComposeError, ComposeResult};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackGraph {
    /// `dependency -> {dependent, ...}`
    downstream: BTreeMap<String, BTreeSet<String>>,
    /// `dependent -> {dependency, ...}`
    upstream: BTreeMap<String, BTreeSet<String>>,
}

impl StackGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stack(&mut self, name: &str) -> ComposeResult<()> {
        if self.contains(name) {
            return Err(ComposeError::DuplicateStack {
                name: name.to_string(),
            });
        }

        self.downstream.insert(name.to_string(), BTreeSet::new());
        self.upstream.insert(name.to_string(), BTreeSet::new());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.upstream.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.upstream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upstream.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.upstream.values().map(BTreeSet::len).sum()
    }

    /// Record that `dependent` depends on `dependency`
    ///
    /// Both stacks have to be registered. The edge is rolled back if it closes a cycle.
    pub fn add_dependency(&mut self, dependency: &str, dependent: &str) -> ComposeResult<()> {
        for name in [dependency, dependent] {
            if !self.contains(name) {
                return Err(ComposeError::StackNotFound {
                    name: name.to_string(),
                });
            }
        }

        // A path dependent ->..-> dependency plus the new edge is a cycle
        if let Some(mut path) = self.path(dependent, dependency) {
            path.push(dependent.to_string());
            return Err(ComposeError::DependencyCycle { path });
        }

        self.downstream
            .entry(dependency.to_string())
            .or_default()
            .insert(dependent.to_string());

        self.upstream
            .entry(dependent.to_string())
            .or_default()
            .insert(dependency.to_string());

        Ok(())
    }

    pub fn dependencies_of(&self, name: &str) -> ComposeResult<Vec<&str>> {
        self.neighbours(&self.upstream, name)
    }

    pub fn dependents_of(&self, name: &str) -> ComposeResult<Vec<&str>> {
        self.neighbours(&self.downstream, name)
    }

    /// Stack names with every dependency ahead of its dependents (Kahn's algorithm)
    pub fn topological_order(&self) -> ComposeResult<Vec<String>> {
        let mut in_degree: BTreeMap<&str, usize> = self
            .upstream
            .iter()
            .map(|(name, deps)| (name.as_str(), deps.len()))
            .collect();

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut sorted = Vec::with_capacity(self.len());

        while let Some(name) = ready.pop_first() {
            sorted.push(name.to_string());

            for dependent in self.downstream.get(name).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree -= 1;

                    if *degree == 0 {
                        ready.insert(dependent.as_str());
                    }
                }
            }
        }

        if sorted.len() != self.len() {
            let stuck = in_degree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(name, _)| name.to_string())
                .collect();

            return Err(ComposeError::DependencyCycle { path: stuck });
        }

        Ok(sorted)
    }

    /// Stacks grouped by depth
    ///
    /// A stack lands in the wave after its deepest dependency. Stacks of one
    /// wave never depend on each other and can be provisioned in parallel.
    pub fn waves(&self) -> ComposeResult<Vec<Vec<String>>> {
        let mut depth: BTreeMap<String, usize> = BTreeMap::new();
        let mut waves: Vec<Vec<String>> = vec![];

        for name in self.topological_order()? {
            let level = self
                .upstream
                .get(&name)
                .into_iter()
                .flatten()
                .filter_map(|dep| depth.get(dep))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);

            if waves.len() <= level {
                waves.resize_with(level + 1, Vec::new);
            }

            waves[level].push(name.clone());
            depth.insert(name, level);
        }

        Ok(waves)
    }

    fn neighbours<'a>(
        &'a self,
        edges: &'a BTreeMap<String, BTreeSet<String>>,
        name: &str,
    ) -> ComposeResult<Vec<&'a str>> {
        edges
            .get(name)
            .map(|set| set.iter().map(String::as_str).collect())
            .ok_or_else(|| ComposeError::StackNotFound {
                name: name.to_string(),
            })
    }

    /// Depth-first search for a path `from ->..-> to` along downstream edges
    fn path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let mut visited = BTreeSet::new();
        let mut path = vec![];

        if self.dfs(from, to, &mut visited, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn dfs<'a>(
        &'a self,
        node: &'a str,
        target: &str,
        visited: &mut BTreeSet<&'a str>,
        path: &mut Vec<String>,
    ) -> bool {
        if !visited.insert(node) {
            return false;
        }

        path.push(node.to_string());

        if node == target {
            return true;
        }

        for next in self.downstream.get(node).into_iter().flatten() {
            if self.dfs(next, target, visited, path) {
                return true;
            }
        }

        path.pop();
        false
    }
}
