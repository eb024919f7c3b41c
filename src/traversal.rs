//! Breadth-first traversal over a hypergraph's ports, and longest-path layering for the
//! grid layout engine (§4.6 "layerOf").

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::hypergraph::{HyperEdgeId, Hypergraph, Port, PortOwner, PortRole};
use crate::signature::Signature;

/// Every source port of `g`, ordered breadth-first starting from the left boundary's
/// source ports and a generator's source ports becoming reachable once all of its target
/// ports have been visited. Ties are broken by ascending `HyperEdgeId`, then by port index,
/// matching the order generators were added (§9 "Exposed for testing: `bfs_source_ports`").
pub fn bfs_source_ports<S: Signature>(g: &Hypergraph<S>) -> Vec<Port> {
    let mut visited_targets: HashSet<Port> = HashSet::new();
    let mut emitted_edges: HashSet<HyperEdgeId> = HashSet::new();
    let mut order: Vec<Port> = Vec::new();
    let mut queue: VecDeque<Port> = VecDeque::new();

    let mut boundary_sources: Vec<usize> = g
        .wires()
        .filter_map(|(s, _)| match s.owner {
            PortOwner::Boundary if s.role == PortRole::Source => Some(s.index),
            _ => None,
        })
        .collect();
    boundary_sources.sort_unstable();
    boundary_sources.dedup();
    for idx in boundary_sources {
        queue.push_back(Port::boundary(PortRole::Source, idx));
    }

    while let Some(source) = queue.pop_front() {
        order.push(source);
        let Some(target) = g.target(source) else {
            continue;
        };
        visited_targets.insert(target);
        let Some(e) = target.edge() else { continue };
        if emitted_edges.contains(&e) {
            continue;
        }
        let Some(sig) = g.signature(e) else { continue };
        let all_targets_visited = (0..sig.num_targets()).all(|i| {
            let t = Port::generator(PortRole::Target, e, i);
            g.source(t).is_none() || visited_targets.contains(&t)
        });
        if !all_targets_visited {
            continue;
        }
        emitted_edges.insert(e);
        for i in 0..sig.num_sources() {
            queue.push_back(Port::generator(PortRole::Source, e, i));
        }
    }

    order
}

/// Assign each live hyperedge a non-negative column (layer) so that every wire runs from a
/// lower or equal layer to a strictly higher one: `layerOf(e) = 1 + max(layerOf(p) for p
/// feeding e's target ports)`, `0` if `e` has no incoming wires from another generator
/// (§4.6). Acyclic by I5; a generator reachable only from itself (a cycle) is left out of
/// the returned map.
pub fn layer_assignment<S: Signature>(g: &Hypergraph<S>) -> HashMap<HyperEdgeId, usize> {
    let mut layer: HashMap<HyperEdgeId, usize> = HashMap::new();
    let edges: Vec<HyperEdgeId> = g.edges().collect();
    let mut in_progress: HashSet<HyperEdgeId> = HashSet::new();

    fn resolve<S: Signature>(
        g: &Hypergraph<S>,
        e: HyperEdgeId,
        layer: &mut HashMap<HyperEdgeId, usize>,
        in_progress: &mut HashSet<HyperEdgeId>,
    ) -> Option<usize> {
        if let Some(&l) = layer.get(&e) {
            return Some(l);
        }
        if in_progress.contains(&e) {
            return None;
        }
        in_progress.insert(e);
        let Some(sig) = g.signature(e) else {
            in_progress.remove(&e);
            return None;
        };
        let mut max_pred = None;
        for i in 0..sig.num_targets() {
            let t = Port::generator(PortRole::Target, e, i);
            let Some(src) = g.source(t) else { continue };
            let Some(pred_e) = src.edge() else { continue };
            if let Some(pred_layer) = resolve(g, pred_e, layer, in_progress) {
                max_pred = Some(max_pred.map_or(pred_layer, |m: usize| m.max(pred_layer)));
            }
        }
        in_progress.remove(&e);
        let result = max_pred.map_or(0, |m| m + 1);
        layer.insert(e, result);
        Some(result)
    }

    for e in edges {
        resolve(g, e, &mut layer, &mut in_progress);
    }
    layer
}

/// Group hyperedges by their assigned layer, in ascending layer order, each layer's
/// members in ascending `HyperEdgeId` order.
pub fn layers<S: Signature>(g: &Hypergraph<S>) -> Vec<Vec<HyperEdgeId>> {
    let assignment = layer_assignment(g);
    let mut by_layer: BTreeMap<usize, Vec<HyperEdgeId>> = BTreeMap::new();
    for (e, l) in assignment {
        by_layer.entry(l).or_default().push(e);
    }
    for edges in by_layer.values_mut() {
        edges.sort_unstable();
    }
    by_layer.into_values().collect()
}
