//! Module dependency graph built on `petgraph`.
//!
//! The declared module tree is flattened into a directed graph rooted at an
//! implicit application-container node. Every edge is checked against the
//! archetype policy, and a topological sort yields a dependency-first build
//! order.

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use strata_common::error::{Result, StrataError};
use strata_common::types::{Archetype, ImplementationSource, Lifetime};

use crate::policy;
use crate::spec::{ArchitectureSpec, ModuleSpecification};

/// Contract name given to the implicit root node.
pub const ROOT_CONTRACT: &str = "ApplicationContainer";

/// One module in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// Slash-separated path from the root, e.g. `Svc1/IEngine1`.
    pub path: String,
    /// Contract type name.
    pub contract: String,
    /// Archetype of the contract, if tagged.
    pub archetype: Option<Archetype>,
    /// Declared lifetime.
    pub lifetime: Lifetime,
    /// Declared implementation source.
    pub source: ImplementationSource,
}

/// A dependency graph of modules.
#[derive(Debug)]
pub struct ModuleGraph {
    /// Edges run from a dependency to the module receiving it, weighted by
    /// the dependency's position in the receiver's declaration list.
    graph: petgraph::Graph<ModuleNode, usize>,
    root: NodeIndex,
}

impl ModuleGraph {
    /// Builds the graph for `architecture`, asking `archetype_of` for the
    /// archetype of each declared contract.
    ///
    /// # Errors
    ///
    /// Returns whatever `archetype_of` returns for a contract it cannot resolve.
    pub fn build<F>(architecture: &ArchitectureSpec, mut archetype_of: F) -> Result<Self>
    where
        F: FnMut(&ModuleSpecification) -> Result<Option<Archetype>>,
    {
        let mut graph = petgraph::Graph::new();
        let root = graph.add_node(ModuleNode {
            path: String::new(),
            contract: ROOT_CONTRACT.to_string(),
            archetype: Some(Archetype::ApplicationContainer),
            lifetime: Lifetime::Singleton,
            source: ImplementationSource::Module,
        });
        let mut this = Self { graph, root };
        for (position, module) in architecture.modules.iter().enumerate() {
            let _ = this.add_module(module, (root, position), "", &mut archetype_of)?;
        }
        Ok(this)
    }

    fn add_module<F>(
        &mut self,
        module: &ModuleSpecification,
        (receiver, position): (NodeIndex, usize),
        parent_path: &str,
        archetype_of: &mut F,
    ) -> Result<NodeIndex>
    where
        F: FnMut(&ModuleSpecification) -> Result<Option<Archetype>>,
    {
        let path = if parent_path.is_empty() {
            module.display_name().to_string()
        } else {
            format!("{parent_path}/{}", module.display_name())
        };
        let idx = self.graph.add_node(ModuleNode {
            path: path.clone(),
            contract: module.contract.clone(),
            archetype: archetype_of(module)?,
            lifetime: module.lifetime,
            source: module.implementation.source,
        });
        let _ = self.graph.add_edge(idx, receiver, position);

        // Shared services are built outside the runtime; their declared
        // dependencies are not walked.
        if module.implementation.source == ImplementationSource::Module {
            for (position, dependency) in module.dependencies.iter().enumerate() {
                let _ = self.add_module(dependency, (idx, position), &path, archetype_of)?;
            }
        }
        Ok(idx)
    }

    /// Checks every edge against the archetype policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`StrataError::PolicyViolation`] found.
    pub fn validate(&self) -> Result<()> {
        for edge in self.graph.edge_references() {
            let dependency = &self.graph[edge.source()];
            let receiver = &self.graph[edge.target()];
            policy::ensure_valid_dependency(
                &receiver.contract,
                receiver.archetype,
                &dependency.contract,
                dependency.archetype,
            )?;
        }
        Ok(())
    }

    /// Returns the modules in build order, dependencies first.
    ///
    /// The implicit root is not included.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn resolve_order(&self) -> Result<Vec<&ModuleNode>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .into_iter()
                .filter(|&idx| idx != self.root)
                .filter_map(|idx| self.graph.node_weight(idx))
                .collect()),
            Err(_cycle) => Err(StrataError::configuration(
                "cyclic dependency detected in module graph",
            )),
        }
    }

    /// Returns the direct dependencies of the module at `path`, in the
    /// order they were declared.
    #[must_use]
    pub fn dependencies_of(&self, path: &str) -> Vec<&ModuleNode> {
        let Some(idx) = self.graph.node_indices().find(|&i| self.graph[i].path == path) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .collect();
        edges.sort_by_key(|edge| *edge.weight());
        edges.iter().map(|edge| &self.graph[edge.source()]).collect()
    }

    /// Returns the number of declared modules, nested ones included.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.graph.node_count() - 1
    }
}
