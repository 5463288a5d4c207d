use std::collections::HashSet;

use serde::Serialize;

use crate::grid::Grid;
use crate::tile::{GemType, MatchedTile, Position, Tile, TileId};

pub const MIN_RUN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A maximal line of identical gems at least `MIN_RUN` long.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Run {
    pub orientation: Orientation,
    pub start: Position,
    pub len: usize,
    pub gem: GemType,
}

impl Run {
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.len).map(move |i| match self.orientation {
            Orientation::Horizontal => Position::new(self.start.row, self.start.col + i),
            Orientation::Vertical => Position::new(self.start.row + i, self.start.col),
        })
    }
}

/// Tiles consumed by one detection pass, each at most once even when it
/// sits on a horizontal and a vertical run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchSet {
    tiles: Vec<Tile>,
    ids: HashSet<TileId>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the tile was already in the set.
    pub fn insert(&mut self, tile: Tile) -> bool {
        if !self.ids.insert(tile.id) {
            return false;
        }
        self.tiles.push(tile);
        true
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.tiles.iter().map(Tile::position).collect()
    }

    pub fn to_matched(&self) -> Vec<MatchedTile> {
        self.tiles.iter().map(MatchedTile::from).collect()
    }
}

/// Every maximal run on the grid: rows left to right, then columns top to bottom.
pub fn find_runs(grid: &Grid) -> Vec<Run> {
    let mut runs = Vec::new();

    // Horizontal
    for row in 0..grid.rows() {
        scan_line(grid.cols(), |i| grid.gem_at(row, i), |start, len, gem| {
            runs.push(Run {
                orientation: Orientation::Horizontal,
                start: Position::new(row, start),
                len,
                gem,
            })
        });
    }

    // Vertical
    for col in 0..grid.cols() {
        scan_line(grid.rows(), |i| grid.gem_at(i, col), |start, len, gem| {
            runs.push(Run {
                orientation: Orientation::Vertical,
                start: Position::new(start, col),
                len,
                gem,
            })
        });
    }

    runs
}

/// The set of tiles that belong to any run. Pure; the grid is not touched.
pub fn find_matches(grid: &Grid) -> MatchSet {
    let mut matches = MatchSet::new();
    for run in find_runs(grid) {
        for pos in run.positions() {
            if let Some(tile) = grid.at(pos) {
                matches.insert(*tile);
            }
        }
    }
    matches
}

// An empty cell ends a run exactly like a different gem does.
fn scan_line(
    len: usize,
    gem_at: impl Fn(usize) -> Option<GemType>,
    mut on_run: impl FnMut(usize, usize, GemType),
) {
    let mut start = 0;
    while start < len {
        let Some(gem) = gem_at(start) else {
            start += 1;
            continue;
        };

        let mut end = start + 1;
        while end < len && gem_at(end) == Some(gem) {
            end += 1;
        }

        if end - start >= MIN_RUN {
            on_run(start, end - start, gem);
        }
        start = end;
    }
}
