//! The backtracking subgraph matcher (§4.4): enumerate every way a pattern open
//! hypergraph embeds into a host open hypergraph.
//!
//! The search is driven by the pattern's breadth-first port order from
//! [`crate::traversal::bfs_source_ports`] so that candidate enumeration is deterministic
//! (§5 "Ordering"): host edges are tried in ascending [`HyperEdgeId`] order, and two
//! emitted [`MatchState`]s are never equal (§4.4 step 6).
//!
//! The spec calls for a lazy generator (§9 "Laziness in matching"); Rust has no first-class
//! coroutines suitable here, so the search is expressed as an explicit stack of frames,
//! exposed as an [`Iterator`] that a caller can stop after the first match or drain fully.
//! Each frame snapshots the [`MatchState`] as of entering that depth and clones it per
//! candidate attempt rather than incrementally mutating and undoing shared state — a
//! frame's own candidates are always tried against the same, untouched starting point.
//! Dropping the iterator early drops the frame stack immediately, satisfying §5's
//! "releases any associated auxiliary storage promptly".

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::hypergraph::{HyperEdgeId, Hypergraph, Port, PortOwner, PortRole};
use crate::signature::Signature;
use crate::traversal::bfs_source_ports;

/// A witness of a pattern embedding into a host (§3 "MatchState").
///
/// The four fields are kept mutually consistent by construction: `wires` is never stored,
/// it is recomputed on demand by [`Self::wires`] from `edges`, `ports_source`,
/// `ports_target`, and the pattern's own wire set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchState {
    /// Pattern hyperedge -> host hyperedge, injective on the pattern domain (M2).
    pub edges: HashMap<HyperEdgeId, HyperEdgeId>,
    /// Pattern source port -> host source port.
    pub ports_source: HashMap<Port, Port>,
    /// Pattern target port -> host target port.
    pub ports_target: HashMap<Port, Port>,
}

impl MatchState {
    /// An empty witness: nothing matched yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The host edge a pattern edge is matched to, if committed.
    pub fn image_of_edge(&self, pattern_edge: HyperEdgeId) -> Option<HyperEdgeId> {
        self.edges.get(&pattern_edge).copied()
    }

    /// The host port a pattern source port is matched to, if committed.
    pub fn image_of_source(&self, pattern_port: Port) -> Option<Port> {
        self.ports_source.get(&pattern_port).copied()
    }

    /// The host port a pattern target port is matched to, if committed.
    pub fn image_of_target(&self, pattern_port: Port) -> Option<Port> {
        self.ports_target.get(&pattern_port).copied()
    }

    /// Image of a port of either role, used internally and by callers highlighting a
    /// matched region (§6 "a MatchState value used to highlight matched sub-structure").
    pub fn image_of_port(&self, pattern_port: Port) -> Option<Port> {
        match pattern_port.role {
            PortRole::Source => self.image_of_source(pattern_port),
            PortRole::Target => self.image_of_target(pattern_port),
        }
    }

    /// `(pattern wire) -> (host wire)` implied by the three maps (§3 `wires`), for every
    /// pattern wire whose endpoints are both committed.
    pub fn wires<S: Signature>(
        &self,
        pattern: &Hypergraph<S>,
    ) -> Vec<((Port, Port), (Port, Port))> {
        pattern
            .wires()
            .filter_map(|(ps, pt)| {
                let hs = self.image_of_source(ps)?;
                let ht = self.image_of_target(pt)?;
                Some(((ps, pt), (hs, ht)))
            })
            .collect()
    }
}

/// Enumerate all host source ports not yet used as the image of some pattern source port.
fn unused_host_sources<'a, S: Signature>(
    host: &'a Hypergraph<S>,
    state: &'a MatchState,
) -> impl Iterator<Item = Port> + 'a {
    let used: HashSet<Port> = state.ports_source.values().copied().collect();
    host.wires().map(|(s, _)| s).filter(move |s| !used.contains(s))
}

/// Host source-port candidates for a single pattern source port (§4.4 step 3).
fn candidates_for<S: Signature>(
    pattern: &Hypergraph<S>,
    host: &Hypergraph<S>,
    state: &MatchState,
    pattern_source: Port,
) -> Vec<Port> {
    match pattern_source.owner {
        PortOwner::Boundary => unused_host_sources(host, state).collect(),
        PortOwner::Gen(pe) => {
            if let Some(&he) = state.edges.get(&pe) {
                let candidate = Port::generator(PortRole::Source, he, pattern_source.index);
                let used: HashSet<Port> = state.ports_source.values().copied().collect();
                if used.contains(&candidate) {
                    vec![]
                } else {
                    vec![candidate]
                }
            } else {
                let Some(pattern_sig) = pattern.signature(pe) else {
                    return vec![];
                };
                let used_edges: HashSet<HyperEdgeId> = state.edges.values().copied().collect();
                host.edges()
                    .filter(|he| !used_edges.contains(he))
                    .filter(|he| host.signature(*he) == Some(pattern_sig))
                    .map(|he| Port::generator(PortRole::Source, he, pattern_source.index))
                    .collect()
            }
        }
    }
}

/// Attempt to extend `state` by mapping `pattern_source -> host_source`, then following
/// the wire out of both (M1–M5). Returns the extended state, or `None` if the candidate is
/// inconsistent with what's already committed.
fn try_commit<S: Signature>(
    pattern: &Hypergraph<S>,
    host: &Hypergraph<S>,
    state: &MatchState,
    pattern_source: Port,
    host_source: Port,
) -> Option<MatchState> {
    if host_source.role != PortRole::Source {
        return None;
    }
    let mut next = state.clone();

    if let PortOwner::Gen(pe) = pattern_source.owner {
        commit_edge(pattern, host, &mut next, pe, host_source.edge()?)?;
    }
    if next.ports_source.values().any(|&p| p == host_source) {
        return None;
    }
    next.ports_source.insert(pattern_source, host_source);

    // M4: the wire must correspond. A pattern source with nothing downstream (a dangling
    // right-boundary port) needs no target pairing.
    let Some(pattern_target) = pattern.target(pattern_source) else {
        return Some(next);
    };
    let host_target = host.target(host_source)?;

    if let PortOwner::Gen(pe2) = pattern_target.owner {
        commit_edge(pattern, host, &mut next, pe2, host_target.edge()?)?;
        if host_target.index != pattern_target.index {
            return None;
        }
    }
    match next.ports_target.get(&pattern_target) {
        Some(&existing) if existing != host_target => return None,
        Some(_) => {}
        None => {
            // M5: a host-boundary (or generator) target port is never the image of two
            // distinct pattern target ports.
            if next.ports_target.values().any(|&p| p == host_target) {
                return None;
            }
            next.ports_target.insert(pattern_target, host_target);
        }
    }
    Some(next)
}

/// Commit `pattern_edge -> host_edge` into `state`, checking M1 (same signature) and M2
/// (injective) the first time an edge is matched; consistent re-use otherwise.
fn commit_edge<S: Signature>(
    pattern: &Hypergraph<S>,
    host: &Hypergraph<S>,
    state: &mut MatchState,
    pattern_edge: HyperEdgeId,
    host_edge: HyperEdgeId,
) -> Option<()> {
    match state.edges.get(&pattern_edge) {
        Some(&existing) => {
            if existing != host_edge {
                return None;
            }
        }
        None => {
            if host.signature(host_edge) != pattern.signature(pattern_edge) {
                return None;
            }
            if state.edges.values().any(|&e| e == host_edge) {
                return None;
            }
            state.edges.insert(pattern_edge, host_edge);
        }
    }
    Some(())
}

struct Frame {
    port: Port,
    remaining: std::vec::IntoIter<Port>,
    base_state: MatchState,
}

/// A lazy backtracking search enumerating every [`MatchState`] embedding `pattern` into
/// `host` (§4.4).
///
/// Implements [`Iterator`]; callers may take the first result, collect all of them, or
/// drop the iterator early to abandon the search (§5 "Cancellation / timeouts").
pub struct Matches<'a, S> {
    pattern: &'a Hypergraph<S>,
    host: &'a Hypergraph<S>,
    order: Vec<Port>,
    stack: Vec<Frame>,
    done: bool,
}

/// Enumerate all occurrences of `pattern` inside `host` (§4.4).
pub fn find_matches<'a, S: Signature>(
    pattern: &'a Hypergraph<S>,
    host: &'a Hypergraph<S>,
) -> Matches<'a, S> {
    let order = bfs_source_ports(pattern);
    let mut stack = Vec::new();
    if let Some(&first_port) = order.first() {
        let base_state = MatchState::new();
        let candidates = candidates_for(pattern, host, &base_state, first_port);
        stack.push(Frame {
            port: first_port,
            remaining: candidates.into_iter(),
            base_state,
        });
    }
    Matches {
        pattern,
        host,
        order,
        stack,
        done: false,
    }
}

/// Whole-graph isomorphism (§11 "Isomorphism check"): `a` and `b` are isomorphic when
/// matching `b` as a pattern inside `a` yields an occurrence that is total on both sides.
/// Reuses the matcher rather than implementing a separate check; `≅` in P3/P4 of §8 is
/// literally this notion.
pub fn is_isomorphic_to<S: Signature>(a: &Hypergraph<S>, b: &Hypergraph<S>) -> bool {
    if a.edge_count() != b.edge_count() || a.wire_count() != b.wire_count() || a.size() != b.size()
    {
        return false;
    }
    find_matches(b, a).any(|m| m.edges.len() == b.edge_count())
}

impl<'a, S: Signature> Iterator for Matches<'a, S> {
    type Item = MatchState;

    fn next(&mut self) -> Option<MatchState> {
        if self.done {
            return None;
        }
        if self.order.is_empty() {
            // An empty pattern (no ports to place) matches once, trivially.
            self.done = true;
            return Some(MatchState::new());
        }
        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.done = true;
                return None;
            };
            let port = frame.port;
            match frame.remaining.next() {
                None => {
                    trace!(?port, "exhausted candidates, backtracking");
                    self.stack.pop();
                    if self.stack.is_empty() {
                        self.done = true;
                        return None;
                    }
                }
                Some(candidate) => {
                    match try_commit(self.pattern, self.host, &frame.base_state, port, candidate) {
                        None => continue,
                        Some(new_state) => {
                            if self.stack.len() == self.order.len() {
                                return Some(new_state);
                            }
                            let next_port = self.order[self.stack.len()];
                            let candidates =
                                candidates_for(self.pattern, self.host, &new_state, next_port);
                            debug!(port = ?next_port, candidates = candidates.len(), "visiting pattern port");
                            self.stack.push(Frame {
                                port: next_port,
                                remaining: candidates.into_iter(),
                                base_state: new_state,
                            });
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypergraph::Hypergraph;
    use crate::signature::GeneratorSignature;

    fn f() -> GeneratorSignature {
        GeneratorSignature::new("f", 1, 1)
    }

    fn g() -> GeneratorSignature {
        GeneratorSignature::new("g", 1, 1)
    }

    fn wrapped_chain(sigs: &[GeneratorSignature]) -> Hypergraph<GeneratorSignature> {
        let mut h: Hypergraph<GeneratorSignature> = Hypergraph::empty();
        let mut edges = Vec::new();
        for s in sigs {
            let (e, h2) = h.add_edge(s.clone());
            h = h2;
            edges.push(e);
        }
        for (i, &e) in edges.iter().enumerate() {
            h = h.connect(
                Port::boundary(PortRole::Source, i),
                Port::generator(PortRole::Target, e, 0),
            );
            h = h.connect(
                Port::generator(PortRole::Source, e, 0),
                Port::boundary(PortRole::Target, i),
            );
        }
        h
    }

    fn pattern_single(sig: GeneratorSignature) -> Hypergraph<GeneratorSignature> {
        wrapped_chain(&[sig])
    }

    #[test]
    fn matches_two_disjoint_copies_matches_scenario_5() {
        let host = wrapped_chain(&[f(), f()]);
        let pattern = pattern_single(f());
        let results: Vec<_> = find_matches(&pattern, &host).collect();
        assert_eq!(results.len(), 2);
        assert_ne!(results[0].edges, results[1].edges);
    }

    #[test]
    fn no_match_when_signature_differs() {
        let host = wrapped_chain(&[g()]);
        let pattern = pattern_single(f());
        let results: Vec<_> = find_matches(&pattern, &host).collect();
        assert!(results.is_empty());
    }

    #[test]
    fn no_third_match_is_emitted() {
        let host = wrapped_chain(&[f(), f()]);
        let pattern = pattern_single(f());
        let mut it = find_matches(&pattern, &host);
        assert!(it.next().is_some());
        assert!(it.next().is_some());
        assert!(it.next().is_none());
    }

    #[test]
    fn every_match_satisfies_m1_same_signature() {
        let host = wrapped_chain(&[f(), f(), g()]);
        let pattern = pattern_single(f());
        for m in find_matches(&pattern, &host) {
            for (&pe, &he) in &m.edges {
                assert_eq!(pattern.signature(pe), host.signature(he));
            }
        }
    }

    #[test]
    fn match_state_wires_line_up_with_host() {
        let host = wrapped_chain(&[f()]);
        let pattern = pattern_single(f());
        let m = find_matches(&pattern, &host).next().unwrap();
        let wires = m.wires(&pattern);
        assert_eq!(wires.len(), 2);
        for (_, (hs, ht)) in wires {
            assert_eq!(host.target(hs), Some(ht));
        }
    }

    #[test]
    fn no_two_emitted_matches_are_equal() {
        let host = wrapped_chain(&[f(), f(), f()]);
        let pattern = pattern_single(f());
        let results: Vec<_> = find_matches(&pattern, &host).collect();
        for i in 0..results.len() {
            for j in (i + 1)..results.len() {
                assert_ne!(results[i], results[j]);
            }
        }
    }

    #[test]
    fn boundary_candidates_are_not_reused_across_pattern_ports() {
        let host = wrapped_chain(&[f(), f()]);
        let mut pattern: Hypergraph<GeneratorSignature> = Hypergraph::empty();
        pattern = pattern.connect(
            Port::boundary(PortRole::Source, 0),
            Port::boundary(PortRole::Target, 0),
        );
        pattern = pattern.connect(
            Port::boundary(PortRole::Source, 1),
            Port::boundary(PortRole::Target, 1),
        );
        let results: Vec<_> = find_matches(&pattern, &host).collect();
        assert!(!results.is_empty());
        for m in &results {
            let mapped: HashSet<_> = m.ports_source.values().collect();
            assert_eq!(mapped.len(), m.ports_source.len());
        }
    }

    #[test]
    fn empty_pattern_matches_once() {
        let host = wrapped_chain(&[f()]);
        let pattern: Hypergraph<GeneratorSignature> = Hypergraph::empty();
        let results: Vec<_> = find_matches(&pattern, &host).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].edges.is_empty());
    }

    #[test]
    fn identical_graphs_are_isomorphic() {
        let a = wrapped_chain(&[f(), g()]);
        let b = wrapped_chain(&[f(), g()]);
        assert!(is_isomorphic_to(&a, &b));
    }

    #[test]
    fn differing_edge_counts_are_not_isomorphic() {
        let a = wrapped_chain(&[f()]);
        let b = wrapped_chain(&[f(), g()]);
        assert!(!is_isomorphic_to(&a, &b));
    }
}
