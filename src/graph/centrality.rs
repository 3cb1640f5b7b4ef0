use crate::graph::ServiceGraph;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Betweenness centrality for every node: the fraction of all-pairs
/// shortest paths that pass through it, normalized by the
/// `(n-1)(n-2)` ordered pairs excluding the node itself.
///
/// Brandes' dependency accumulation over unweighted BFS trees; edge
/// direction is respected.
pub fn betweenness(graph: &ServiceGraph) -> BTreeMap<String, f64> {
    let names: Vec<&str> = graph.service_names().collect();
    let n = names.len();
    let mut score: BTreeMap<String, f64> =
        names.iter().map(|s| (s.to_string(), 0.0)).collect();
    // Fewer than 3 nodes means no (s, v, t) triple exists.
    if n < 3 {
        return score;
    }

    for &source in &names {
        let mut stack: Vec<&str> = Vec::new();
        let mut preds: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut sigma: HashMap<&str, f64> = HashMap::new();
        let mut dist: HashMap<&str, usize> = HashMap::new();
        sigma.insert(source, 1.0);
        dist.insert(source, 0);

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let next_dist = dist[v] + 1;
            let sigma_v = sigma[v];
            for w in graph.successors(v) {
                if !dist.contains_key(w) {
                    dist.insert(w, next_dist);
                    queue.push_back(w);
                }
                if dist[w] == next_dist {
                    *sigma.entry(w).or_insert(0.0) += sigma_v;
                    preds.entry(w).or_default().push(v);
                }
            }
        }

        // Accumulate dependencies in reverse BFS order.
        let mut delta: HashMap<&str, f64> = HashMap::new();
        while let Some(w) = stack.pop() {
            let delta_w = delta.get(w).copied().unwrap_or(0.0);
            if let Some(parents) = preds.get(w) {
                let coeff = (1.0 + delta_w) / sigma[w];
                for &v in parents {
                    *delta.entry(v).or_insert(0.0) += sigma[v] * coeff;
                }
            }
            if w != source {
                if let Some(entry) = score.get_mut(w) {
                    *entry += delta_w;
                }
            }
        }
    }

    let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
    for value in score.values_mut() {
        *value *= scale;
    }
    score
}
