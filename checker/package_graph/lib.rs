use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use checker__source::Span;

type ImportAdjacencyByPackage = BTreeMap<String, BTreeSet<String>>;
type ImportSiteByEdge = BTreeMap<(String, String), ImportSite>;

/// One import declaration between two workspace packages.
#[derive(Clone, Debug)]
pub struct ImportEdge {
    pub source_package_path: String,
    pub target_package_path: String,
    pub source_path: PathBuf,
    pub import_span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("package import cycle detected: {}", .cycle.join(" -> "))]
pub struct ImportCycleError {
    /// Starts and ends with the same package.
    pub cycle: Vec<String>,
    /// The import that closes the cycle, when it is known.
    pub path: Option<PathBuf>,
    pub span: Option<Span>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Imports among the packages of a workspace. Imports of packages outside
/// the workspace are not edges.
#[derive(Debug)]
pub struct PackageGraph {
    adjacency_by_package: ImportAdjacencyByPackage,
    first_import_site_by_edge: ImportSiteByEdge,
}

impl PackageGraph {
    pub fn new(packages: impl IntoIterator<Item = String>, imports: &[ImportEdge]) -> Self {
        let mut adjacency_by_package: ImportAdjacencyByPackage = packages
            .into_iter()
            .map(|package| (package, BTreeSet::new()))
            .collect();
        let mut first_import_site_by_edge: ImportSiteByEdge = BTreeMap::new();

        for import in imports {
            if import.source_package_path == import.target_package_path
                || !adjacency_by_package.contains_key(&import.target_package_path)
            {
                continue;
            }
            let Some(targets) = adjacency_by_package.get_mut(&import.source_package_path) else {
                continue;
            };
            targets.insert(import.target_package_path.clone());
            first_import_site_by_edge
                .entry((
                    import.source_package_path.clone(),
                    import.target_package_path.clone(),
                ))
                .or_insert_with(|| ImportSite {
                    path: import.source_path.clone(),
                    span: import.import_span.clone(),
                });
        }

        Self {
            adjacency_by_package,
            first_import_site_by_edge,
        }
    }

    /// Every package after all of the packages it imports; ties are broken
    /// by import path.
    pub fn dependency_order(&self) -> Result<Vec<String>, ImportCycleError> {
        if let Some(cycle) = self.first_cycle() {
            let site = self
                .first_import_site_by_edge
                .get(&(cycle[0].clone(), cycle[1].clone()))
                .cloned();
            return Err(ImportCycleError {
                cycle,
                path: site.as_ref().map(|site| site.path.clone()),
                span: site.map(|site| site.span),
            });
        }

        let mut order = Vec::new();
        let mut visited = BTreeSet::new();
        for package in self.adjacency_by_package.keys() {
            self.post_order(package, &mut visited, &mut order);
        }
        Ok(order)
    }

    #[must_use]
    pub fn contains(&self, package: &str) -> bool {
        self.adjacency_by_package.contains_key(package)
    }

    /// Packages reachable from `package` through imports, not including it.
    #[must_use]
    pub fn transitive_imports(&self, package: &str) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        let mut pending: Vec<&str> = vec![package];
        while let Some(current) = pending.pop() {
            let Some(targets) = self.adjacency_by_package.get(current) else {
                continue;
            };
            for target in targets {
                if target != package && reached.insert(target.clone()) {
                    pending.push(target);
                }
            }
        }
        reached
    }

    fn post_order(&self, package: &str, visited: &mut BTreeSet<String>, order: &mut Vec<String>) {
        if !visited.insert(package.to_string()) {
            return;
        }
        if let Some(targets) = self.adjacency_by_package.get(package) {
            for target in targets {
                self.post_order(target, visited, order);
            }
        }
        order.push(package.to_string());
    }

    fn first_cycle(&self) -> Option<Vec<String>> {
        let mut state_by_node: BTreeMap<String, VisitState> = BTreeMap::new();
        let mut stack = Vec::new();
        let mut index_by_node_in_stack: BTreeMap<String, usize> = BTreeMap::new();

        for package in self.adjacency_by_package.keys() {
            if state_by_node.contains_key(package) {
                continue;
            }
            if let Some(cycle) = self.depth_first_search(
                package,
                &mut state_by_node,
                &mut stack,
                &mut index_by_node_in_stack,
            ) {
                return Some(cycle);
            }
        }
        None
    }

    fn depth_first_search(
        &self,
        node: &str,
        state_by_node: &mut BTreeMap<String, VisitState>,
        stack: &mut Vec<String>,
        index_by_node_in_stack: &mut BTreeMap<String, usize>,
    ) -> Option<Vec<String>> {
        state_by_node.insert(node.to_string(), VisitState::Visiting);
        index_by_node_in_stack.insert(node.to_string(), stack.len());
        stack.push(node.to_string());

        if let Some(neighbors) = self.adjacency_by_package.get(node) {
            for neighbor in neighbors {
                if let Some(index) = index_by_node_in_stack.get(neighbor) {
                    let mut cycle = stack[*index..].to_vec();
                    cycle.push(neighbor.clone());
                    return Some(cycle);
                }
                if state_by_node.get(neighbor) == Some(&VisitState::Visited) {
                    continue;
                }
                if let Some(cycle) =
                    self.depth_first_search(neighbor, state_by_node, stack, index_by_node_in_stack)
                {
                    return Some(cycle);
                }
            }
        }

        stack.pop();
        index_by_node_in_stack.remove(node);
        state_by_node.insert(node.to_string(), VisitState::Visited);
        None
    }
}

#[derive(Clone, Debug)]
struct ImportSite {
    path: PathBuf,
    span: Span,
}
