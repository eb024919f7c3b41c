//! The core hypergraph data model (§3, §4.1): hyperedges, ports, the monogamous
//! connections bijection, and the boundary/identifier invariants I1–I4.
//!
//! Hypergraphs are value-typed (§3 "Lifecycle"): every mutation in this module takes
//! `&self` or `self` and returns a new `Hypergraph`, never mutating one through a shared
//! reference. Sharing of unchanged substructure is left to the allocator; no
//! persistent-data-structure trick is required.

mod bimap;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::trace;

use crate::signature::Signature;
use bimap::BiMap;

/// A strictly ordered, locally-unique hyperedge identifier (§3 "HyperEdgeId").
///
/// Never reused within a hypergraph's lifetime (I4).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, derive_more::From)]
pub struct HyperEdgeId(pub usize);

/// `Source` denotes an output of a producer, `Target` an input of a consumer. Wire-
/// relative, not generator-relative (§3 "PortRole").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PortRole {
    /// The tail of a wire: an output of a generator, or the left boundary.
    Source,
    /// The head of a wire: an input of a generator, or the right boundary.
    Target,
}

/// Either a dangling port on the outer interface, or a port of a specific generator
/// (§3 "PortOwner").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PortOwner {
    /// A dangling port on the outer interface of the open hypergraph.
    Boundary,
    /// A port of hyperedge `e`.
    Gen(HyperEdgeId),
}

/// The triple `(role, owner, index)` identifying a single port (§3 "Port").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Port {
    /// Whether this port is a wire source or target.
    pub role: PortRole,
    /// What this port belongs to.
    pub owner: PortOwner,
    /// The dense, role-local index of this port on its owner.
    pub index: usize,
}

impl Port {
    /// A boundary port.
    pub fn boundary(role: PortRole, index: usize) -> Self {
        Self {
            role,
            owner: PortOwner::Boundary,
            index,
        }
    }

    /// A port of generator `e`.
    pub fn generator(role: PortRole, e: HyperEdgeId, index: usize) -> Self {
        Self {
            role,
            owner: PortOwner::Gen(e),
            index,
        }
    }

    /// The owning hyperedge, if this isn't a boundary port.
    pub fn edge(&self) -> Option<HyperEdgeId> {
        match self.owner {
            PortOwner::Boundary => None,
            PortOwner::Gen(e) => Some(e),
        }
    }
}

/// Precondition violations (§4.1 "Failure conditions", §7 "Precondition violation"): the
/// caller is wrong, not the hypergraph. Public mutation operations never return this for
/// ordinary structural cases — those are no-ops or `Option`s (§7) — it is only used for the
/// few genuine construction-time checks spec.md calls out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HypergraphError {
    /// A port named an edge that has no signature registered.
    #[error("port {0:?} refers to unknown hyperedge {1:?}")]
    UnknownEdge(Port, HyperEdgeId),
    /// A port index exceeded the arity of its owning generator's signature.
    #[error("port {0:?} index out of range for its generator's signature")]
    PortIndexOutOfRange(Port),
}

/// An open hypergraph (§3 "Hypergraph (open)").
///
/// `connections` is a bijection between source ports and target ports (I1 monogamy):
/// each source port is the tail of at most one wire and each target port the head of at
/// most one. `signatures` maps each live hyperedge to its generator label. `next_id` is
/// the smallest unused identifier (I4).
#[derive(Clone, Debug)]
pub struct Hypergraph<S> {
    connections: BiMap<Port, Port>,
    signatures: BTreeMap<HyperEdgeId, S>,
    next_id: HyperEdgeId,
}

impl<S> Default for Hypergraph<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> Hypergraph<S> {
    /// The zero-object hypergraph: no edges, no wires, no boundary.
    pub fn empty() -> Self {
        Self {
            connections: BiMap::new(),
            signatures: BTreeMap::new(),
            next_id: HyperEdgeId(0),
        }
    }

    /// `nextHyperEdgeId`: the smallest unused hyperedge identifier.
    pub fn next_hyperedge_id(&self) -> HyperEdgeId {
        self.next_id
    }

    /// The signature of `e`, if it is a live hyperedge.
    pub fn signature(&self, e: HyperEdgeId) -> Option<&S> {
        self.signatures.get(&e)
    }

    /// All live hyperedges, in ascending identifier order.
    pub fn edges(&self) -> impl Iterator<Item = HyperEdgeId> + '_ {
        self.signatures.keys().copied()
    }

    /// Number of live hyperedges.
    pub fn edge_count(&self) -> usize {
        self.signatures.len()
    }

    /// Number of wires.
    pub fn wire_count(&self) -> usize {
        self.connections.len()
    }

    /// Bidirectional lookup: the target port a wire from `s` ends at, if any. `O(log n)`.
    pub fn target(&self, s: Port) -> Option<Port> {
        self.connections.get(&s).copied()
    }

    /// Bidirectional lookup: the source port a wire into `t` begins at, if any. `O(log n)`.
    pub fn source(&self, t: Port) -> Option<Port> {
        self.connections.get_by_value(&t).copied()
    }

    /// All wires, as `(source, target)` pairs.
    pub fn wires(&self) -> impl Iterator<Item = (Port, Port)> + '_ {
        self.connections.iter().map(|(&s, &t)| (s, t))
    }

    /// `(inWidth, outWidth)`: the width of the left and right boundaries (§4.1 `size`).
    /// Left-boundary ports carry `Source` role, right-boundary ports carry `Target` role
    /// (see [`Hypergraph::identity`]); `(0, 0)` if no boundary ports are in use.
    pub fn size(&self) -> (usize, usize) {
        let boundary_ports = self
            .connections
            .iter()
            .flat_map(|(&s, &t)| [s, t])
            .filter(|p| matches!(p.owner, PortOwner::Boundary));
        let (mut in_width, mut out_width) = (0usize, 0usize);
        for p in boundary_ports {
            match p.role {
                PortRole::Source => in_width = in_width.max(p.index + 1),
                PortRole::Target => out_width = out_width.max(p.index + 1),
            }
        }
        (in_width, out_width)
    }

    /// The wire whose endpoint is target port `i` of `e`, if any (§4.1 `inputWires`).
    pub fn input_wires(&self, e: HyperEdgeId) -> Vec<Option<(Port, Port)>>
    where
        S: Signature,
    {
        let Some(sig) = self.signature(e) else {
            return vec![];
        };
        (0..sig.num_targets())
            .map(|i| {
                let t = Port::generator(PortRole::Target, e, i);
                self.source(t).map(|s| (s, t))
            })
            .collect()
    }

    /// The wire whose endpoint is source port `i` of `e`, if any (§4.1 `outputWires`).
    pub fn output_wires(&self, e: HyperEdgeId) -> Vec<Option<(Port, Port)>>
    where
        S: Signature,
    {
        let Some(sig) = self.signature(e) else {
            return vec![];
        };
        (0..sig.num_sources())
            .map(|i| {
                let s = Port::generator(PortRole::Source, e, i);
                self.target(s).map(|t| (s, t))
            })
            .collect()
    }

    /// A minimal GraphViz DOT dump for debugging (§11 "DOT-style debug rendering"): nodes
    /// are hyperedges labelled by signature, edges are wires. Not the (out-of-scope) SVG
    /// renderer — a plain-text debugging affordance, the ecosystem analogue of `Debug`.
    pub fn dot_string(&self) -> String
    where
        S: std::fmt::Debug,
    {
        let mut out = String::from("digraph hypergraph {\n");
        for e in self.edges() {
            out.push_str(&format!(
                "  n{} [label=\"{:?}\", shape=box];\n",
                e.0,
                self.signature(e).unwrap()
            ));
        }
        for (s, t) in self.wires() {
            let from = match s.owner {
                PortOwner::Gen(e) => format!("n{}", e.0),
                PortOwner::Boundary => format!("in_{}", s.index),
            };
            let to = match t.owner {
                PortOwner::Gen(e) => format!("n{}", e.0),
                PortOwner::Boundary => format!("out_{}", t.index),
            };
            out.push_str(&format!("  {} -> {};\n", from, to));
        }
        out.push_str("}\n");
        out
    }
}

impl<S: Clone> Hypergraph<S> {
    /// Build a hypergraph directly from its parts. Used by [`crate::algebraic`] and
    /// [`crate::rewrite`], which construct the wire set and signature map up front rather
    /// than growing them one `connect`/`add_edge` call at a time.
    pub(crate) fn from_parts(
        wires: impl IntoIterator<Item = (Port, Port)>,
        signatures: BTreeMap<HyperEdgeId, S>,
        next_id: HyperEdgeId,
    ) -> Self {
        let mut connections = BiMap::new();
        for (s, t) in wires {
            connections.insert(s, t);
        }
        Self {
            connections,
            signatures,
            next_id,
        }
    }

    /// The identity wire on width 1: a wire from `Boundary 0` to `Boundary 0`.
    pub fn identity() -> Self {
        let mut g = Self::empty();
        g.connections.insert(
            Port::boundary(PortRole::Source, 0),
            Port::boundary(PortRole::Target, 0),
        );
        g
    }

    /// Allocate a new hyperedge labelled `sig`, initially unconnected. Never fails.
    pub fn add_edge(&self, sig: S) -> (HyperEdgeId, Self) {
        let mut g = self.clone();
        let e = g.next_id;
        g.signatures.insert(e, sig);
        g.next_id = HyperEdgeId(e.0 + 1);
        trace!(edge = e.0, "added hyperedge");
        (e, g)
    }

    /// Insert the wire `s -> t`. If `s` already had a target, or `t` already had a source,
    /// that old wire is removed first, preserving monogamy by construction. Never fails.
    pub fn connect(&self, s: Port, t: Port) -> Self {
        let mut g = self.clone();
        g.connections.insert(s, t);
        trace!(?s, ?t, "connected wire");
        g
    }

    /// Remove the wire leaving `s`, if any.
    pub fn disconnect_source(&self, s: Port) -> Self {
        let mut g = self.clone();
        g.connections.remove_by_key(&s);
        g
    }

    /// Remove the wire arriving at `t`, if any.
    pub fn disconnect_target(&self, t: Port) -> Self {
        let mut g = self.clone();
        g.connections.remove_by_value(&t);
        g
    }

    /// Remove `e`'s signature and every wire touching any of its ports. A no-op if `e` is
    /// unknown.
    pub fn delete_edge(&self, e: HyperEdgeId) -> Self
    where
        S: Signature,
    {
        let mut g = self.clone();
        if g.signatures.remove(&e).is_none() {
            return g;
        }
        let stale: Vec<Port> = g
            .connections
            .iter()
            .flat_map(|(&s, &t)| [s, t])
            .filter(|p| p.edge() == Some(e))
            .collect();
        for p in stale {
            g.connections.remove_by_key(&p);
            g.connections.remove_by_value(&p);
        }
        g
    }
}
