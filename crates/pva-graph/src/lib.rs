//! Step-dependency graph
//!
//! One shared utility validates and orders implementation steps for both the
//! planner and the completion engine. Construction rejects duplicate ids,
//! unresolved dependencies, self-loops and cycles; ordering is deterministic
//! for a given input.

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;

/// Structural errors a step set can exhibit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Two steps share an id
    #[error("duplicate step id: {0}")]
    DuplicateId(String),

    /// A dependency names an id that does not exist
    #[error("step {step} depends on unknown id: {dependency}")]
    UnknownDependency {
        /// Step declaring the dependency
        step: String,
        /// The unresolved id
        dependency: String,
    },

    /// A step depends on itself
    #[error("step {0} depends on itself")]
    SelfLoop(String),

    /// The dependency graph contains a cycle
    #[error("dependency cycle involving step {0}")]
    CycleDetected(String),
}

/// A validated dependency graph over step ids
///
/// Nodes are indices into the original step slice, so the caller can map an
/// order back to its own step type.
#[derive(Debug)]
pub struct StepGraph {
    ids: Vec<String>,
    graph: DiGraphMap<usize, ()>,
}

impl StepGraph {
    /// Build and validate a graph from `(id, dependencies)` pairs
    ///
    /// # Errors
    /// Returns the first structural defect found: duplicate id, unknown
    /// dependency, self-loop, or cycle.
    pub fn build(steps: &[(String, Vec<String>)]) -> Result<Self, GraphError> {
        let mut ids: Vec<String> = Vec::with_capacity(steps.len());
        for (id, _) in steps {
            if ids.contains(id) {
                return Err(GraphError::DuplicateId(id.clone()));
            }
            ids.push(id.clone());
        }

        let index_of = |id: &str| ids.iter().position(|i| i == id);

        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for idx in 0..ids.len() {
            graph.add_node(idx);
        }

        for (step_idx, (id, deps)) in steps.iter().enumerate() {
            for dep in deps {
                if dep == id {
                    return Err(GraphError::SelfLoop(id.clone()));
                }
                let Some(dep_idx) = index_of(dep) else {
                    return Err(GraphError::UnknownDependency {
                        step: id.clone(),
                        dependency: dep.clone(),
                    });
                };
                // Edge direction: dependency → dependent
                graph.add_edge(dep_idx, step_idx, ());
            }
        }

        if is_cyclic_directed(&graph) {
            // Name one participant for the error; toposort tells us which
            let offender = toposort(&graph, None)
                .err()
                .map(|c| ids[c.node_id()].clone())
                .unwrap_or_else(|| ids.first().cloned().unwrap_or_default());
            return Err(GraphError::CycleDetected(offender));
        }

        Ok(Self { ids, graph })
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the graph is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// A valid topological order of step ids
    #[must_use]
    pub fn topological_order(&self) -> Vec<String> {
        // Construction proved acyclicity, so toposort cannot fail here
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|i| self.ids[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Dependency-respecting order that prefers lighter weights among ready
    /// steps
    ///
    /// `weight` maps a step index to a scheduling weight; among steps whose
    /// dependencies are all satisfied, the lowest (weight, index) runs first.
    /// This is Kahn's algorithm with a deterministic tie-break.
    #[must_use]
    pub fn scheduled_order<F>(&self, weight: F) -> Vec<String>
    where
        F: Fn(usize) -> u8,
    {
        let n = self.ids.len();
        let mut indegree = vec![0usize; n];
        for (_, to, ()) in self.graph.all_edges() {
            indegree[to] += 1;
        }

        let mut ready: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while !ready.is_empty() {
            let pick_pos = ready
                .iter()
                .enumerate()
                .min_by_key(|&(_, &idx)| (weight(idx), idx))
                .map(|(pos, _)| pos)
                .unwrap_or(0);
            let next = ready.swap_remove(pick_pos);
            order.push(self.ids[next].clone());

            for succ in self.graph.neighbors(next) {
                indegree[succ] -= 1;
                if indegree[succ] == 0 {
                    ready.push(succ);
                }
            }
        }

        order
    }
}
