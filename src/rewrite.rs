//! Double-pushout rewriting (§4.5): apply a rule `L ⇒ R` at a [`MatchState`] of `L` in a
//! host hypergraph, producing a new host plus a witness of where `R` landed.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tracing::trace;

use crate::hypergraph::{HyperEdgeId, Hypergraph, Port, PortOwner, PortRole};
use crate::matching::{find_matches, MatchState};
use crate::signature::Signature;

/// Construction-time failure: `L` and `R` have incompatible boundary widths (§4.5
/// "Failure", §7 "Precondition violation"). Rejected when the rule is built, never at
/// application time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RewriteError {
    /// `L`'s and `R`'s `(inWidth, outWidth)` differ.
    #[error("rule boundary mismatch: L has size {l:?}, R has size {r:?}")]
    BoundaryMismatch {
        /// `L`'s `size()`.
        l: (usize, usize),
        /// `R`'s `size()`.
        r: (usize, usize),
    },
}

fn rename_port(p: Port, shift: usize) -> Port {
    match p.owner {
        PortOwner::Gen(HyperEdgeId(id)) => Port {
            owner: PortOwner::Gen(HyperEdgeId(id + shift)),
            ..p
        },
        PortOwner::Boundary => p,
    }
}

/// A rewrite rule `L ⇒ R`, checked at construction time to have matching boundary widths.
#[derive(Clone, Debug)]
pub struct Rule<S> {
    lhs: Hypergraph<S>,
    rhs: Hypergraph<S>,
}

impl<S: Signature + Clone> Rule<S> {
    /// Build a rule from its left- and right-hand sides, rejecting a boundary-width
    /// mismatch immediately (§4.5 "reject at construction time").
    pub fn new(lhs: Hypergraph<S>, rhs: Hypergraph<S>) -> Result<Self, RewriteError> {
        if lhs.size() != rhs.size() {
            return Err(RewriteError::BoundaryMismatch {
                l: lhs.size(),
                r: rhs.size(),
            });
        }
        Ok(Self { lhs, rhs })
    }

    /// The rule's left-hand side (the pattern to match).
    pub fn lhs(&self) -> &Hypergraph<S> {
        &self.lhs
    }

    /// The rule's right-hand side (the replacement).
    pub fn rhs(&self) -> &Hypergraph<S> {
        &self.rhs
    }

    /// Every occurrence of `self.lhs()` in `host` (§4.4, reused as-is for rewriting).
    pub fn matches<'a>(
        &'a self,
        host: &'a Hypergraph<S>,
    ) -> impl Iterator<Item = MatchState> + 'a {
        find_matches(&self.lhs, host)
    }

    /// Apply this rule at `m`, a match of `self.lhs()` in `host` (§4.5).
    ///
    /// 1. Delete every matched edge, and every wire with an endpoint on a matched edge.
    /// 2. Embed `R` with fresh hyperedge identifiers; its internal wires carry over.
    /// 3. Stitch: for each left-boundary index of `L`, the host wire that used to feed the
    ///    matched pattern's corresponding target is rerouted onto `R`'s target for that
    ///    index (dually for the right boundary and sources). Boundary widths of `L`/`R`
    ///    match by construction, so every index is covered.
    ///
    /// Returns the new host and a [`MatchState`] witnessing where `R` landed: `edges` and
    /// the per-port maps describe `R`'s generator ports in terms of their fresh identities.
    pub fn apply(&self, host: &Hypergraph<S>, m: &MatchState) -> (Hypergraph<S>, MatchState) {
        let fresh_base = host.next_hyperedge_id().0;
        let matched_host_edges: HashSet<HyperEdgeId> = m.edges.values().copied().collect();
        let is_matched =
            |p: Port| matches!(p.owner, PortOwner::Gen(e) if matched_host_edges.contains(&e));
        let rename = |p: Port| rename_port(p, fresh_base);

        // Step 1: keep host wires with neither endpoint on a matched edge.
        let mut wires: Vec<(Port, Port)> = host
            .wires()
            .filter(|(s, t)| !is_matched(*s) && !is_matched(*t))
            .collect();

        let mut signatures: BTreeMap<HyperEdgeId, S> = host
            .edges()
            .filter(|e| !matched_host_edges.contains(e))
            .map(|e| (e, host.signature(e).unwrap().clone()))
            .collect();
        for e in self.rhs.edges() {
            signatures.insert(
                HyperEdgeId(e.0 + fresh_base),
                self.rhs.signature(e).unwrap().clone(),
            );
        }

        // Step 2: R's internal wires (neither endpoint on R's own boundary) carry over.
        for (s, t) in self.rhs.wires() {
            if !matches!(s.owner, PortOwner::Boundary) && !matches!(t.owner, PortOwner::Boundary)
            {
                wires.push((rename(s), rename(t)));
            }
        }

        // Step 3: stitch both boundaries.
        let (width_in, width_out) = self.lhs.size();
        for i in 0..width_in {
            let Some(l_target) = self.lhs.target(Port::boundary(PortRole::Source, i)) else {
                continue;
            };
            let Some(host_target) = m.image_of_target(l_target) else {
                continue;
            };
            let Some(host_source) = host.source(host_target) else {
                continue;
            };
            let Some(r_target) = self.rhs.target(Port::boundary(PortRole::Source, i)) else {
                continue;
            };
            wires.push((host_source, rename(r_target)));
        }
        for i in 0..width_out {
            let Some(l_source) = self.lhs.source(Port::boundary(PortRole::Target, i)) else {
                continue;
            };
            let Some(host_source_img) = m.image_of_source(l_source) else {
                continue;
            };
            let Some(host_target) = host.target(host_source_img) else {
                continue;
            };
            let Some(r_source) = self.rhs.source(Port::boundary(PortRole::Target, i)) else {
                continue;
            };
            wires.push((rename(r_source), host_target));
        }

        // Witness: R's own edges/ports in terms of their fresh identities.
        let mut image = MatchState::new();
        for e in self.rhs.edges() {
            let he = HyperEdgeId(e.0 + fresh_base);
            image.edges.insert(e, he);
            if let Some(sig) = self.rhs.signature(e) {
                for k in 0..sig.num_targets() {
                    let rp = Port::generator(PortRole::Target, e, k);
                    image.ports_target.insert(rp, rename(rp));
                }
                for k in 0..sig.num_sources() {
                    let rp = Port::generator(PortRole::Source, e, k);
                    image.ports_source.insert(rp, rename(rp));
                }
            }
        }

        let next_id = HyperEdgeId(fresh_base + self.rhs.next_hyperedge_id().0);
        trace!(fresh_base, "applied rewrite rule");
        (Hypergraph::from_parts(wires, signatures, next_id), image)
    }
}
