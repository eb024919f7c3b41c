//! Hypergraph + Grid, pseudonodes, and the editor-safe mutations (§4.6).
//!
//! A [`Layout`] pairs a [`Hypergraph`] with a [`Grid`] of [`Tile`]s such that every live
//! hyperedge has exactly one [`Tile::HyperEdge`] and every wire spanning more than one
//! column has exactly the right number of [`Tile::Pseudo`] tiles immediately to its right
//! (I5, P10). Mutations recompute pseudonodes globally rather than trying to patch them
//! incrementally — simpler to keep correct, and cheap at the scale this core targets (§5
//! "Resource discipline": `O(|tiles|)`).
//!
//! Like [`Hypergraph`], every operation here is value-typed: `&self -> Self` rather than
//! `&mut self`, even though the underlying [`Grid`] uses interior mutation to do its
//! shift-to-make-space bookkeeping.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::grid::{Grid, V2};
use crate::hypergraph::{HyperEdgeId, Hypergraph, Port, PortOwner, PortRole};
use crate::signature::GeneratorLayout;

/// Reserved for editor operations with no sane recovery (§4.6 "Failure conditions" names
/// none beyond the no-ops already handled by [`Layout::connect_ports`]). Kept so this
/// subsystem has its own error type at the seam of fallible construction, the way every
/// other module here does; nothing currently constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LayoutError {}

/// A tile placed on a [`Layout`]'s grid: either a hyperedge, or a synthetic bend on a wire
/// (§3 "Tile").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Tile {
    /// The tile for a live hyperedge.
    HyperEdge(HyperEdgeId),
    /// The `offset`-th synthetic bend on the wire from `s` to `t` (§3 "PseudoNode").
    Pseudo(Port, Port, usize),
}

/// A hypergraph paired with a 2-D grid of tiles (§3 "Layout").
#[derive(Clone, Debug)]
pub struct Layout<S> {
    hypergraph: Hypergraph<S>,
    grid: Grid<Tile>,
}

impl<S> Default for Layout<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> Layout<S> {
    /// An empty layout: no generators, no boundary.
    pub fn empty() -> Self {
        Self {
            hypergraph: Hypergraph::empty(),
            grid: Grid::new(),
        }
    }

    /// The underlying hypergraph.
    pub fn hypergraph(&self) -> &Hypergraph<S> {
        &self.hypergraph
    }

    /// The position of a tile, if placed.
    pub fn position(&self, tile: Tile) -> Option<V2> {
        self.grid.position(&tile)
    }

    /// Every placed tile and its position (§6 `positions(layout) -> map Tile -> V2(Int)`).
    pub fn positions(&self) -> HashMap<Tile, V2> {
        self.grid
            .tiles()
            .map(|&t| (t, self.grid.position(&t).expect("tile is placed")))
            .collect()
    }
}

impl<S: GeneratorLayout + Clone> Layout<S> {
    /// `dimensions(layout) -> V2(Int)`: grid width plus the two boundary columns, and the
    /// taller of the grid's occupied height or either boundary's width (§4.6, §6).
    pub fn dimensions(&self) -> V2 {
        let (in_width, out_width) = self.hypergraph.size();
        let height = self
            .grid
            .height()
            .max(in_width as i64)
            .max(out_width as i64);
        V2::new(self.grid.width() + 2, height)
    }

    /// The column one past the rightmost placed generator/pseudonode tile: the x-position
    /// of the right (output) boundary.
    fn right_boundary_x(&self) -> i64 {
        self.grid.width()
    }

    /// `portPosition(port, layout) -> Option<V2(Int)>` (§6).
    pub fn port_position(&self, port: Port) -> Option<V2> {
        match port.owner {
            PortOwner::Boundary => match port.role {
                PortRole::Source => Some(V2::new(-1, port.index as i64)),
                PortRole::Target => Some(V2::new(self.right_boundary_x(), port.index as i64)),
            },
            PortOwner::Gen(e) => {
                let pos = self.grid.position(&Tile::HyperEdge(e))?;
                let sig = self.hypergraph.signature(e)?;
                let offsets = match port.role {
                    PortRole::Target => sig.target_offsets(),
                    PortRole::Source => sig.source_offsets(),
                };
                let dy = *offsets.get(port.index)? as i64;
                Some(V2::new(pos.x, pos.y + dy))
            }
        }
    }

    /// `canConnectPorts(s, t, l)` (§4.6): boundaries always connect; two generator ports
    /// connect only when the source's column is strictly less than the target's (I5).
    pub fn can_connect_ports(&self, s: Port, t: Port) -> bool {
        if matches!(s.owner, PortOwner::Boundary) || matches!(t.owner, PortOwner::Boundary) {
            return true;
        }
        match (self.port_position(s), self.port_position(t)) {
            (Some(ps), Some(pt)) => ps.x < pt.x,
            _ => false,
        }
    }

    /// Recompute every [`Tile::Pseudo`] from scratch: one per integer column strictly
    /// between a wire's source and target column (§4.6, P10).
    fn rebuild_pseudonodes(&mut self) {
        let stale: Vec<Tile> = self
            .grid
            .tiles()
            .copied()
            .filter(|t| matches!(t, Tile::Pseudo(..)))
            .collect();
        for t in stale {
            self.grid.remove_tile(&t);
        }
        let wires: Vec<(Port, Port)> = self.hypergraph.wires().collect();
        for (s, t) in wires {
            let (Some(ps), Some(pt)) = (self.port_position(s), self.port_position(t)) else {
                continue;
            };
            let count = (pt.x - ps.x - 1).max(0);
            for offset in 0..count {
                let tile = Tile::Pseudo(s, t, offset as usize);
                self.grid.place(tile, V2::new(ps.x + 1 + offset, ps.y), 1);
            }
        }
    }

    /// `placeGenerator(sig, pos) -> (e, l')` (§4.6).
    pub fn place_generator(&self, sig: S, pos: V2) -> (HyperEdgeId, Self) {
        let mut l = self.clone();
        let (e, hg) = l.hypergraph.add_edge(sig.clone());
        l.hypergraph = hg;
        l.grid.place(Tile::HyperEdge(e), pos, sig.height());
        l.rebuild_pseudonodes();
        debug!(edge = e.0, ?pos, "placed generator");
        (e, l)
    }

    /// `connectPorts(s, t, l)` (§4.6): a silent no-op when
    /// [`Self::can_connect_ports`] is false (§7 "Invariant rejection").
    pub fn connect_ports(&self, s: Port, t: Port) -> Self {
        if !self.can_connect_ports(s, t) {
            return self.clone();
        }
        let mut l = self.clone();
        l.hypergraph = l.hypergraph.connect(s, t);
        l.rebuild_pseudonodes();
        l
    }

    /// Remove the wire leaving `s`, if any, and the pseudonodes it owned.
    pub fn disconnect_source(&self, s: Port) -> Self {
        let mut l = self.clone();
        l.hypergraph = l.hypergraph.disconnect_source(s);
        l.rebuild_pseudonodes();
        l
    }

    /// Remove the wire arriving at `t`, if any, and the pseudonodes it owned.
    pub fn disconnect_target(&self, t: Port) -> Self {
        let mut l = self.clone();
        l.hypergraph = l.hypergraph.disconnect_target(t);
        l.rebuild_pseudonodes();
        l
    }

    /// `deleteGenerator(e)` (§4.6): `Hypergraph::deleteEdge` plus `Grid::removeTile`, plus
    /// a global pseudonode recompute.
    pub fn delete_generator(&self, e: HyperEdgeId) -> Self
    where
        S: crate::signature::Signature,
    {
        let mut l = self.clone();
        l.hypergraph = l.hypergraph.delete_edge(e);
        l.grid.remove_tile(&Tile::HyperEdge(e));
        l.rebuild_pseudonodes();
        l
    }

    /// `move(tile, pos)` (§4.6). For a [`Tile::HyperEdge`], wires whose endpoints now
    /// violate I5 are dropped. For a [`Tile::Pseudo`], only the y coordinate moves.
    pub fn move_tile(&self, tile: Tile, pos: V2) -> Self
    where
        S: crate::signature::Signature,
    {
        let mut l = self.clone();
        match tile {
            Tile::HyperEdge(_) => {
                let height = l.grid.height_of(&tile).unwrap_or(1);
                l.grid.place(tile, pos, height);
                let bad_sources: Vec<Port> = l
                    .hypergraph
                    .wires()
                    .filter(|(s, t)| {
                        let (PortOwner::Gen(_), PortOwner::Gen(_)) = (s.owner, t.owner) else {
                            return false;
                        };
                        matches!((l.port_position(*s), l.port_position(*t)), (Some(ps), Some(pt)) if ps.x >= pt.x)
                    })
                    .map(|(s, _)| s)
                    .collect();
                for s in bad_sources {
                    l.hypergraph = l.hypergraph.disconnect_source(s);
                }
                l.rebuild_pseudonodes();
            }
            Tile::Pseudo(..) => {
                if let Some(existing) = l.grid.position(&tile) {
                    let height = l.grid.height_of(&tile).unwrap_or(1);
                    l.grid.place(tile, V2::new(existing.x, pos.y), height);
                }
            }
        }
        l
    }

    /// `insertLayer(x, n)` (§4.6): shift every tile in columns `>= x` right by `n`.
    pub fn insert_layer(&self, x: i64, n: i64) -> Self {
        let mut l = self.clone();
        l.grid.insert_layer(x, n);
        l.rebuild_pseudonodes();
        l
    }

    /// `removePseudonodeOnlyLayers` (§4.6): delete columns containing only pseudonodes.
    pub fn remove_pseudonode_only_layers(&self) -> Self {
        let mut l = self.clone();
        for x in 0..l.grid.width() {
            let column = l.grid.column(x).to_vec();
            if !column.is_empty() && column.iter().all(|t| matches!(t, Tile::Pseudo(..))) {
                for t in column {
                    l.grid.remove_tile(&t);
                }
            }
        }
        l.grid.remove_empty_columns();
        l.rebuild_pseudonodes();
        l
    }

    /// `lookup(pos) -> (Maybe target, Maybe source)` (§4.6): left-boundary cells give
    /// `(Nothing, Just(Port Source Boundary y))`; right-boundary cells the dual; a
    /// generator cell gives whichever port(s) sit at that row of its tile; any other cell
    /// (including a pseudonode's) gives `(Nothing, Nothing)`.
    pub fn lookup(&self, pos: V2) -> (Option<Port>, Option<Port>) {
        if pos.x == -1 {
            return (None, Some(Port::boundary(PortRole::Source, pos.y as usize)));
        }
        if pos.x == self.right_boundary_x() {
            return (Some(Port::boundary(PortRole::Target, pos.y as usize)), None);
        }
        let Some(&Tile::HyperEdge(e)) = self.grid.lookup(pos) else {
            return (None, None);
        };
        let Some(tile_pos) = self.grid.position(&Tile::HyperEdge(e)) else {
            return (None, None);
        };
        let dy = (pos.y - tile_pos.y) as usize;
        let Some(sig) = self.hypergraph.signature(e) else {
            return (None, None);
        };
        let target = sig
            .target_offsets()
            .iter()
            .position(|&o| o == dy)
            .map(|i| Port::generator(PortRole::Target, e, i));
        let source = sig
            .source_offsets()
            .iter()
            .position(|&o| o == dy)
            .map(|i| Port::generator(PortRole::Source, e, i));
        (target, source)
    }

    /// A minimal GraphViz DOT dump for debugging (§11): generators labelled by signature,
    /// pseudonodes as small filled dots. Not a substitute for the (out-of-scope) SVG
    /// renderer, just a text affordance for inspecting a layout without one.
    pub fn dot_string(&self) -> String
    where
        S: std::fmt::Debug,
    {
        let mut out = String::from("digraph layout {\n");
        for e in self.hypergraph.edges() {
            let sig = self.hypergraph.signature(e).unwrap();
            out.push_str(&format!(
                "  n{} [label=\"{:?}\", shape=box];\n",
                e.0, sig
            ));
        }
        for tile in self.grid.tiles() {
            if let Tile::Pseudo(s, t, offset) = tile {
                out.push_str(&format!(
                    "  p{}_{}_{} [label=\"\", shape=point, width=0.05];\n",
                    port_tag(*s),
                    port_tag(*t),
                    offset
                ));
            }
        }
        for (s, t) in self.hypergraph.wires() {
            let from = match s.owner {
                PortOwner::Gen(e) => format!("n{}", e.0),
                PortOwner::Boundary => format!("boundary_in_{}", s.index),
            };
            let to = match t.owner {
                PortOwner::Gen(e) => format!("n{}", e.0),
                PortOwner::Boundary => format!("boundary_out_{}", t.index),
            };
            out.push_str(&format!("  {} -> {};\n", from, to));
        }
        out.push_str("}\n");
        out
    }
}

fn port_tag(p: Port) -> String {
    match p.owner {
        PortOwner::Gen(e) => format!("g{}_{}", e.0, p.index),
        PortOwner::Boundary => format!("b_{}", p.index),
    }
}
