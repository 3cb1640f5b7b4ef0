use crate::graph::{
    centrality, EdgeView, GraphView, MetricsUpdate, NodeView, ServiceNode, ServiceTelemetry,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Directed service-dependency graph with per-node telemetry and
/// derived metrics.
///
/// Every mutation ends by recomputing the derived fields, so any
/// `&self` read observes blast radius, impact score, and centrality
/// consistent with the current edge set and telemetry.
#[derive(Debug, Default)]
pub struct ServiceGraph {
    nodes: BTreeMap<String, ServiceNode>,
    // Successor lists preserve edge-insertion order; traversal
    // tie-breaks depend on it.
    adjacency: HashMap<String, Vec<String>>,
    // Telemetry snapshot taken at construction; reset_telemetry
    // restores it.
    baseline: BTreeMap<String, ServiceTelemetry>,
}

impl ServiceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from seed telemetry and a dependency edge list,
    /// remembering the seed values as the reset baseline.
    pub fn with_topology<S, E>(services: S, edges: E) -> Self
    where
        S: IntoIterator<Item = (String, ServiceTelemetry)>,
        E: IntoIterator<Item = (String, String)>,
    {
        let mut graph = Self::new();
        for (name, telemetry) in services {
            graph.insert_node(name, telemetry);
        }
        for (source, target) in edges {
            graph.insert_edge(&source, &target);
        }
        graph.baseline = graph
            .nodes
            .iter()
            .map(|(name, node)| (name.clone(), node.telemetry.clone()))
            .collect();
        graph.compute_derived();
        graph
    }

    fn insert_node(&mut self, name: String, telemetry: ServiceTelemetry) {
        self.adjacency.entry(name.clone()).or_default();
        self.nodes.entry(name).or_insert(ServiceNode {
            telemetry,
            blast_radius: 0,
            impact_score: 0.0,
            centrality: 0.0,
        });
    }

    // Self-loops and duplicate (source, target) pairs are ignored;
    // unknown endpoints are created with default telemetry.
    fn insert_edge(&mut self, source: &str, target: &str) {
        if source == target {
            tracing::warn!(%source, "ignoring self-loop dependency edge");
            return;
        }
        if !self.nodes.contains_key(source) {
            self.insert_node(source.to_string(), ServiceTelemetry::default());
        }
        if !self.nodes.contains_key(target) {
            self.insert_node(target.to_string(), ServiceTelemetry::default());
        }
        let successors = self.adjacency.entry(source.to_string()).or_default();
        if !successors.iter().any(|s| s == target) {
            successors.push(target.to_string());
        }
    }

    /// Add a dependency edge after construction.
    pub fn add_dependency(&mut self, source: &str, target: &str) {
        self.insert_edge(source, target);
        self.compute_derived();
    }

    /// Upsert the raw telemetry fields for a service. An unknown
    /// service name is added as a new isolated node, never an error.
    pub fn attach_telemetry(&mut self, service: &str, update: MetricsUpdate) {
        if !self.nodes.contains_key(service) {
            tracing::info!(%service, "attaching telemetry to unknown service, adding node");
            self.insert_node(service.to_string(), ServiceTelemetry::default());
        }
        if let Some(node) = self.nodes.get_mut(service) {
            node.telemetry.error_rate = update.error_rate;
            node.telemetry.latency = update.latency;
            node.telemetry.cpu_usage = update.cpu_usage;
            node.telemetry.downstream_failures = update.downstream_failures;
            node.telemetry.traffic_volume = update.traffic_volume;
        }
        self.compute_derived();
    }

    /// Restore every known service to its baseline telemetry while
    /// preserving topology. Services added after construction fall
    /// back to default telemetry.
    pub fn reset_telemetry(&mut self) {
        for (name, node) in self.nodes.iter_mut() {
            node.telemetry = self
                .baseline
                .get(name)
                .cloned()
                .unwrap_or_default();
        }
        self.compute_derived();
    }

    /// Recompute blast radius, impact score, and centrality for every
    /// node from the current topology and telemetry.
    pub fn compute_derived(&mut self) {
        let names: Vec<String> = self.nodes.keys().cloned().collect();
        let total = names.len() as f64;

        for name in &names {
            let blast_radius = self.reachable_count(name);
            if let Some(node) = self.nodes.get_mut(name) {
                node.blast_radius = blast_radius;
                node.impact_score = (node.telemetry.error_rate * (1.0 + blast_radius as f64)
                    / total)
                    .min(1.0);
            }
        }

        let scores = centrality::betweenness(self);
        for (name, score) in scores {
            if let Some(node) = self.nodes.get_mut(&name) {
                node.centrality = score;
            }
        }
    }

    // Size of the reachable-descendant set: BFS over outgoing edges
    // with a visited set, so cycles terminate and the start node is
    // never counted.
    fn reachable_count(&self, start: &str) -> usize {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        let mut count = 0;
        while let Some(current) = queue.pop_front() {
            for next in self.successors(current) {
                if visited.insert(next) {
                    count += 1;
                    queue.push_back(next);
                }
            }
        }
        count
    }

    /// Current impact score for every service.
    pub fn impact_scores(&self) -> BTreeMap<String, f64> {
        self.nodes
            .iter()
            .map(|(name, node)| (name.clone(), node.impact_score))
            .collect()
    }

    pub fn contains(&self, service: &str) -> bool {
        self.nodes.contains_key(service)
    }

    pub fn node(&self, service: &str) -> Option<&ServiceNode> {
        self.nodes.get(service)
    }

    /// Successors of a service in edge-insertion order.
    pub fn successors(&self, service: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(service)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Service names in lexicographic order.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Snapshot of all nodes and edges for serialization.
    pub fn view(&self) -> GraphView {
        let nodes = self
            .nodes
            .iter()
            .map(|(name, node)| NodeView {
                id: name.clone(),
                node: node.clone(),
            })
            .collect();
        let mut edges = Vec::new();
        for name in self.nodes.keys() {
            for target in self.successors(name) {
                edges.push(EdgeView {
                    source: name.clone(),
                    target: target.to_string(),
                });
            }
        }
        GraphView { nodes, edges }
    }
}

/// Cloneable handle to the process-wide graph store.
///
/// Writers (`attach_telemetry`, `reset_telemetry`) must hold the write
/// guard for the whole mutate-then-recompute sequence; read-only
/// queries share the read guard.
#[derive(Debug, Clone)]
pub struct SharedGraph {
    inner: Arc<RwLock<ServiceGraph>>,
}

impl SharedGraph {
    pub fn new(graph: ServiceGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ServiceGraph> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ServiceGraph> {
        self.inner.write()
    }
}
