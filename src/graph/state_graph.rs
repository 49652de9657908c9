//! A small state graph: named async nodes joined by fixed or conditional edges.

use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Sentinel target that stops execution.
pub const END: &str = "__end__";

/// Steps allowed before a run is aborted.
const DEFAULT_RECURSION_LIMIT: usize = 25;

/// One step of a graph: takes the state and returns the updated state.
#[async_trait]
pub trait Node<S>: Send + Sync {
    async fn run(&self, state: S) -> Result<S>;
}

/// Picks a branch key from the current state.
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

enum Edge<S> {
    Direct(String),
    Conditional {
        router: Router<S>,
        targets: HashMap<String, String>,
    },
}

/// Graph under construction.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    entry: Option<String>,
    recursion_limit: usize,
}

impl<S> Default for StateGraph<S> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl<S: Send + 'static> StateGraph<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named node.
    pub fn add_node(&mut self, name: &str, node: Arc<dyn Node<S>>) -> Result<&mut Self> {
        if name == END {
            return Err(PalaverError::Graph(format!("'{}' is a reserved node name", END)));
        }
        if self.nodes.insert(name.to_string(), node).is_some() {
            return Err(PalaverError::Graph(format!("Node '{}' already exists", name)));
        }
        Ok(self)
    }

    /// Set the node execution starts from.
    pub fn set_entry_point(&mut self, name: &str) -> &mut Self {
        self.entry = Some(name.to_string());
        self
    }

    /// Always continue from `from` to `to`.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<&mut Self> {
        self.insert_edge(from, Edge::Direct(to.to_string()))
    }

    /// Continue from `from` to the target the router's key maps to.
    pub fn add_conditional_edges<F>(
        &mut self,
        from: &str,
        router: F,
        targets: &[(&str, &str)],
    ) -> Result<&mut Self>
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        let targets = targets
            .iter()
            .map(|(key, target)| (key.to_string(), target.to_string()))
            .collect();
        self.insert_edge(
            from,
            Edge::Conditional {
                router: Arc::new(router),
                targets,
            },
        )
    }

    /// Maximum number of node executions per run.
    pub fn with_recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    fn insert_edge(&mut self, from: &str, edge: Edge<S>) -> Result<&mut Self> {
        if self.edges.insert(from.to_string(), edge).is_some() {
            return Err(PalaverError::Graph(format!(
                "Node '{}' already has outgoing edges",
                from
            )));
        }
        Ok(self)
    }

    /// Validate the wiring and produce a runnable graph.
    pub fn compile(self) -> Result<CompiledGraph<S>> {
        let entry = self
            .entry
            .clone()
            .ok_or_else(|| PalaverError::Graph("No entry point set".to_string()))?;
        if !self.nodes.contains_key(&entry) {
            return Err(PalaverError::Graph(format!("Entry point '{}' is not a node", entry)));
        }

        let known = |name: &str| name == END || self.nodes.contains_key(name);
        for (from, edge) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(PalaverError::Graph(format!("Edge from unknown node '{}'", from)));
            }
            let bad_target = match edge {
                Edge::Direct(to) => (!known(to)).then_some(to),
                Edge::Conditional { targets, .. } => targets.values().find(|t| !known(t)),
            };
            if let Some(target) = bad_target {
                return Err(PalaverError::Graph(format!(
                    "Edge from '{}' to unknown node '{}'",
                    from, target
                )));
            }
        }

        if let Some(dead_end) = self.nodes.keys().find(|n| !self.edges.contains_key(*n)) {
            return Err(PalaverError::Graph(format!(
                "Node '{}' has no outgoing edge",
                dead_end
            )));
        }

        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
            recursion_limit: self.recursion_limit,
        })
    }
}

/// A validated graph ready to run.
pub struct CompiledGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    entry: String,
    recursion_limit: usize,
}

impl<S: Send + 'static> CompiledGraph<S> {
    /// Run from the entry point until a node routes to [`END`].
    pub async fn invoke(&self, mut state: S) -> Result<S> {
        let mut current = self.entry.clone();
        let mut steps = 0;

        loop {
            steps += 1;
            if steps > self.recursion_limit {
                return Err(PalaverError::Graph(format!(
                    "Recursion limit of {} reached without hitting END",
                    self.recursion_limit
                )));
            }

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| PalaverError::Graph(format!("Unknown node '{}'", current)))?;
            debug!("Graph step {}: {}", steps, current);
            state = node.run(state).await?;

            let next = match self.edges.get(&current) {
                Some(Edge::Direct(to)) => to.clone(),
                Some(Edge::Conditional { router, targets }) => {
                    let key = router(&state);
                    targets.get(&key).cloned().ok_or_else(|| {
                        PalaverError::Graph(format!(
                            "Router for '{}' returned unmapped branch '{}'",
                            current, key
                        ))
                    })?
                }
                None => END.to_string(),
            };

            if next == END {
                return Ok(state);
            }
            current = next;
        }
    }
}
