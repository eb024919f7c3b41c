#![warn(missing_docs)]

//! `hypergraph_core` models string diagrams of a symmetric monoidal category as directed,
//! open hypergraphs: hyperedges with signatures, monogamous wires between their ports, and
//! a dangling left/right boundary standing in for the diagram's own ports.
//!
//! It is a core, not an application: no SVG renderer, no file format, no undo stack. Three
//! layers build on each other and never depend downward:
//!
//! - [`hypergraph`] (L1): the data model and its invariants (monogamy, boundary density,
//!   identifier monotonicity, acyclicity), plus [`algebraic`]'s `⊗`/`→` composition.
//! - [`matching`] and [`rewrite`] (L2): subgraph matching and double-pushout rewriting over
//!   an L1 hypergraph.
//! - [`layout`] (L3): a 2-D grid placement of an L1 hypergraph's tiles, built for an editor
//!   to drive directly.
//!
//! [`equivalence`], [`grid`], [`traversal`] and [`signature`] are shared utilities used
//! across those layers.
//!
//! # Features
//!
//! - `serde` enables serialization of the leaf value types ([`signature::GeneratorSignature`],
//!   [`hypergraph::HyperEdgeId`], [`hypergraph::Port`]); the persistent structures built on
//!   top of them (`Hypergraph`, `Grid`, `Equivalence`) are not serialized directly.

pub mod algebraic;
pub mod equivalence;
pub mod grid;
pub mod hypergraph;
pub mod layout;
pub mod matching;
pub mod rewrite;
pub mod signature;
pub mod traversal;

pub use crate::algebraic::{sequential, tensor};
pub use crate::equivalence::{ClassId, Equivalence};
pub use crate::grid::{Grid, V2};
pub use crate::hypergraph::{HyperEdgeId, Hypergraph, HypergraphError, Port, PortOwner, PortRole};
pub use crate::layout::{Layout, LayoutError, Tile};
pub use crate::matching::{find_matches, is_isomorphic_to, MatchState, Matches};
pub use crate::rewrite::{Rule, RewriteError};
pub use crate::signature::{GeneratorLayout, GeneratorSignature, Signature};
