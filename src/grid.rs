//! 2-D placement of variable-height tiles with shift-to-make-space semantics (§3 "Grid").
//!
//! `Grid` is generic over the tile identity `T`; the [`crate::layout`] module instantiates
//! it with its own `Tile` enum (`HyperEdge(e)` or `PseudoNode`).

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

pub use cgmath::Vector2;

/// An integer grid position. `x` is the column, `y` the row.
pub type V2 = Vector2<i64>;

/// A tile's placement: its top-left position and its height in rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Placement {
    pos: V2,
    height: usize,
}

/// A 2-D grid of variable-height, 1-column-wide tiles.
///
/// Invariants maintained after every mutation:
/// - for each column, tiles are kept in ascending-`y` order;
/// - an inverse lookup from any occupied cell to its tile is kept up to date;
/// - `width`/`height` reflect the furthest-right / furthest-down occupied cell.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    placements: HashMap<T, Placement>,
    /// Tiles occupying each column, kept in ascending `y` order.
    columns: BTreeMap<i64, Vec<T>>,
    /// Inverse lookup: cell -> tile occupying it.
    cells: HashMap<(i64, i64), T>,
}

impl<T: Clone + Eq + Hash> Default for Grid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> Grid<T> {
    /// An empty grid.
    pub fn new() -> Self {
        Self {
            placements: HashMap::new(),
            columns: BTreeMap::new(),
            cells: HashMap::new(),
        }
    }

    /// The position of `tile`, if placed.
    pub fn position(&self, tile: &T) -> Option<V2> {
        self.placements.get(tile).map(|p| p.pos)
    }

    /// The height of `tile`, if placed.
    pub fn height_of(&self, tile: &T) -> Option<usize> {
        self.placements.get(tile).map(|p| p.height)
    }

    /// The tile occupying `pos`, if any.
    pub fn lookup(&self, pos: V2) -> Option<&T> {
        self.cells.get(&(pos.x, pos.y))
    }

    /// Total occupied width (one past the largest occupied column), `0` if empty.
    pub fn width(&self) -> i64 {
        self.columns
            .keys()
            .next_back()
            .map(|&x| x + 1)
            .unwrap_or(0)
    }

    /// Total occupied height (one past the largest occupied row), `0` if empty.
    pub fn height(&self) -> i64 {
        self.placements
            .values()
            .map(|p| p.pos.y + p.height as i64)
            .max()
            .unwrap_or(0)
    }

    /// All tiles currently placed.
    pub fn tiles(&self) -> impl Iterator<Item = &T> {
        self.placements.keys()
    }

    /// Tiles in `column`, in ascending `y` order.
    pub fn column(&self, x: i64) -> &[T] {
        self.columns.get(&x).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove `tile` from the grid entirely, if present.
    pub fn remove_tile(&mut self, tile: &T) {
        let Some(placement) = self.placements.remove(tile) else {
            return;
        };
        self.unindex(tile, &placement);
    }

    /// Place `tile` (height `height`, `height >= 1`) at `pos`.
    ///
    /// If this would overlap tiles already in the column, those tiles (and anything they
    /// in turn overlap, transitively) are shifted downward by the minimum amount needed to
    /// open space, preserving their relative order.
    pub fn place(&mut self, tile: T, pos: V2, height: usize) {
        let height = height.max(1);
        if let Some(old) = self.placements.remove(&tile) {
            self.unindex(&tile, &old);
        }
        self.make_room(pos.x, pos.y, height);
        let placement = Placement { pos, height };
        self.index(tile.clone(), &placement);
        self.placements.insert(tile, placement);
    }

    /// Shift every tile in columns `>= x` right by `n`, leaving a gap (§4.6 `insertLayer`).
    pub fn insert_layer(&mut self, x: i64, n: i64) {
        if n == 0 {
            return;
        }
        let moved: Vec<(T, Placement)> = self
            .placements
            .iter()
            .filter(|(_, p)| p.pos.x >= x)
            .map(|(t, p)| (t.clone(), *p))
            .collect();
        for (tile, placement) in &moved {
            self.unindex(tile, placement);
        }
        for (tile, mut placement) in moved {
            placement.pos.x += n;
            self.index(tile.clone(), &placement);
            self.placements.insert(tile, placement);
        }
    }

    /// Delete columns that contain no tiles, compacting the grid leftward, preserving the
    /// relative order of remaining columns.
    pub fn remove_empty_columns(&mut self) {
        let occupied: Vec<i64> = self.columns.keys().copied().collect();
        let remap: HashMap<i64, i64> = occupied
            .iter()
            .enumerate()
            .map(|(new_x, &old_x)| (old_x, new_x as i64))
            .collect();
        let all: Vec<(T, Placement)> = self
            .placements
            .iter()
            .map(|(t, p)| (t.clone(), *p))
            .collect();
        self.placements.clear();
        self.columns.clear();
        self.cells.clear();
        for (tile, mut placement) in all {
            placement.pos.x = remap[&placement.pos.x];
            self.index(tile.clone(), &placement);
            self.placements.insert(tile, placement);
        }
    }

    /// Shift every tile at or below `y0` in column `x` down by `by` rows so that a tile of
    /// the given `height` can be placed at `(x, y0)` without overlapping.
    fn make_room(&mut self, x: i64, y0: i64, height: usize) {
        let Some(col) = self.columns.get(&x) else {
            return;
        };
        let overlapping: Vec<T> = col
            .iter()
            .filter(|t| {
                let p = &self.placements[*t];
                ranges_overlap(p.pos.y, p.height, y0, height)
            })
            .cloned()
            .collect();
        if overlapping.is_empty() {
            return;
        }
        let shift = overlapping
            .iter()
            .map(|t| y0 + height as i64 - self.placements[t].pos.y)
            .max()
            .unwrap_or(0)
            .max(0);
        if shift == 0 {
            return;
        }
        for tile in overlapping {
            let mut placement = self.placements[&tile];
            self.unindex(&tile, &placement);
            placement.pos.y += shift;
            // Recursively push anything the shifted tile now overlaps.
            self.make_room(x, placement.pos.y, placement.height);
            self.index(tile.clone(), &placement);
            self.placements.insert(tile, placement);
        }
    }

    fn index(&mut self, tile: T, placement: &Placement) {
        let col = self.columns.entry(placement.pos.x).or_default();
        let insert_at = col
            .iter()
            .position(|t| self.placements[t].pos.y > placement.pos.y)
            .unwrap_or(col.len());
        col.insert(insert_at, tile.clone());
        for dy in 0..placement.height as i64 {
            self.cells
                .insert((placement.pos.x, placement.pos.y + dy), tile.clone());
        }
    }

    fn unindex(&mut self, tile: &T, placement: &Placement) {
        if let Some(col) = self.columns.get_mut(&placement.pos.x) {
            col.retain(|t| t != tile);
            if col.is_empty() {
                self.columns.remove(&placement.pos.x);
            }
        }
        for dy in 0..placement.height as i64 {
            self.cells.remove(&(placement.pos.x, placement.pos.y + dy));
        }
    }
}

fn ranges_overlap(y0: i64, h0: usize, y1: i64, h1: usize) -> bool {
    y0 < y1 + h1 as i64 && y1 < y0 + h0 as i64
}
