use serde::Serialize;
use tracing::{debug, warn};

use crate::board::Board;
use crate::grid::Grid;
use crate::matcher::{find_matches, MatchSet};
use crate::tile::{MatchedTile, Position, Tile, TileId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TileMove {
    pub id: TileId,
    pub from: Position,
    pub to: Position,
}

/// Everything one resolution pass did, in the order a presentation layer
/// would animate it: removals, falls, then spawns.
#[derive(Clone, Debug, PartialEq)]
pub struct CascadePass {
    pub combo: u32,
    pub removed: Vec<MatchedTile>,
    pub moved: Vec<TileMove>,
    pub spawned: Vec<Tile>,
    pub settled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeResult {
    pub matched_tiles: Vec<MatchedTile>,
    pub combo_count: u32,
}

/// A seed match set being worked down to a settled board, one pass at a time.
#[derive(Debug, Clone)]
pub struct Cascade {
    current: MatchSet,
    matched: Vec<MatchedTile>,
    combo_count: u32,
}

impl Cascade {
    pub fn new(seed: MatchSet) -> Self {
        Self {
            current: seed,
            matched: Vec::new(),
            combo_count: 0,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.current.is_empty()
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    /// Run one match, remove, gravity, refill, detect pass.
    /// Returns `None` once the board is settled.
    pub fn step(&mut self, board: &mut Board) -> Option<CascadePass> {
        if self.is_settled() {
            return None;
        }
        self.combo_count += 1;

        // Remove matched tiles
        let grid = board.grid_mut();
        let mut removed = Vec::with_capacity(self.current.len());
        for tile in self.current.iter() {
            let pos = tile.position();
            grid.mark_matched(pos);
            if let Some(gone) = grid.remove(pos) {
                debug_assert!(gone.is_matched());
                removed.push(MatchedTile::from(&gone));
            }
        }

        let moved = apply_gravity(grid);

        let spawned = board.refill();

        if cfg!(debug_assertions) {
            board.grid().assert_consistent();
        }

        // Past the cap the cascade ends even if the refill left runs behind.
        let cap = board.config().max_cascade_passes;
        self.current = if self.combo_count >= cap {
            let leftover = find_matches(board.grid()).len();
            if leftover > 0 {
                warn!(passes = cap, leftover, "cascade pass cap reached, leaving runs on the board");
            }
            MatchSet::new()
        } else {
            find_matches(board.grid())
        };
        self.matched.extend_from_slice(&removed);

        debug!(
            combo = self.combo_count,
            removed = removed.len(),
            moved = moved.len(),
            spawned = spawned.len(),
            next = self.current.len(),
            "cascade pass"
        );

        Some(CascadePass {
            combo: self.combo_count,
            removed,
            moved,
            spawned,
            settled: self.current.is_empty(),
        })
    }

    pub fn into_result(self) -> CascadeResult {
        CascadeResult {
            matched_tiles: self.matched,
            combo_count: self.combo_count,
        }
    }
}

/// Resolve a seed match set until a detection pass comes back empty.
pub fn resolve(board: &mut Board, initial: MatchSet) -> CascadeResult {
    let mut cascade = Cascade::new(initial);
    while cascade.step(board).is_some() {}
    cascade.into_result()
}

/// Compact each column downwards, keeping the tiles' relative order.
/// Vacated cells are left empty at the top of the column.
pub fn apply_gravity(grid: &mut Grid) -> Vec<TileMove> {
    let mut moves = Vec::new();

    for col in 0..grid.cols() {
        let mut write_row = grid.rows();

        for row in (0..grid.rows()).rev() {
            let Some(tile) = grid.get(row, col) else {
                continue;
            };
            if tile.is_matched() {
                continue;
            }

            write_row -= 1;
            if write_row != row {
                let from = Position::new(row, col);
                let to = Position::new(write_row, col);
                if let Some(tile) = grid.move_tile(from, to) {
                    moves.push(TileMove {
                        id: tile.id,
                        from,
                        to,
                    });
                }
            }
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::tile::GemType;

    fn column(grid: &Grid, col: usize) -> Vec<Option<GemType>> {
        (0..grid.rows()).map(|row| grid.gem_at(row, col)).collect()
    }

    #[test]
    fn gravity_preserves_order() {
        let mut grid = Grid::from_symbols(&["R", ".", "G", ".", "B"]).unwrap();
        let moves = apply_gravity(&mut grid);

        assert_eq!(
            column(&grid, 0),
            vec![None, None, Some(GemType::Red), Some(GemType::Green), Some(GemType::Blue)]
        );
        assert_eq!(moves.len(), 2);
        grid.assert_consistent();
    }

    #[test]
    fn gravity_leaves_full_columns_alone() {
        let mut grid = Grid::from_symbols(&["RG", "B.", "YP"]).unwrap();
        let before = grid.get(0, 0).unwrap().id;
        let moves = apply_gravity(&mut grid);

        assert_eq!(moves.len(), 1);
        assert_eq!(grid.get(0, 0).unwrap().id, before);
        assert_eq!(grid.gem_at(1, 1), Some(GemType::Green));
        assert!(grid.get(0, 1).is_none());
    }

    #[test]
    fn empty_seed_is_settled() {
        let grid = Grid::from_symbols(&["RGB", "GBR", "BRG"]).unwrap();
        let mut board = Board::from_grid(grid, BoardConfig::default(), 0);
        let result = resolve(&mut board, MatchSet::new());
        assert_eq!(result.combo_count, 0);
        assert!(result.matched_tiles.is_empty());
    }

    #[test]
    fn single_pass_removes_and_refills() {
        let grid = Grid::from_symbols(&[
            "GBY", //
            "RRR", //
            "BYG",
        ])
        .unwrap();
        let mut board = Board::from_grid(grid, BoardConfig::default(), 11);
        let seed = find_matches(board.grid());
        let mut cascade = Cascade::new(seed);

        let pass = cascade.step(&mut board).unwrap();
        assert_eq!(pass.combo, 1);
        assert_eq!(pass.removed.len(), 3);
        assert!(pass.removed.iter().all(|t| t.row == 1 && t.gem == GemType::Red));
        // The top row falls one cell in each column.
        assert_eq!(pass.moved.len(), 3);
        assert!(pass.moved.iter().all(|m| m.from.row == 0 && m.to.row == 1));
        assert_eq!(pass.spawned.len(), 3);
        assert!(board.grid().is_full());
    }

    // Clearing the red column drops a green onto the bottom row, which
    // completes a second run without help from the refill.
    const CHAIN: [&str; 5] = [
        "BYB", //
        "GBY", //
        "RYB", //
        "RBY", //
        "RGG",
    ];

    #[test]
    fn pass_cap_ends_cascade_early() {
        let grid = Grid::from_symbols(&CHAIN).unwrap();
        let config = BoardConfig {
            max_cascade_passes: 1,
            ..BoardConfig::default()
        };
        let mut board = Board::from_grid(grid, config, 4);
        let seed = find_matches(board.grid());
        let mut cascade = Cascade::new(seed);

        let pass = cascade.step(&mut board).unwrap();
        assert!(pass.settled);
        assert!(cascade.step(&mut board).is_none());
        assert_eq!(cascade.combo_count(), 1);

        // The chained run is left in place.
        assert!((0..3).all(|col| board.grid().gem_at(4, col) == Some(GemType::Green)));
        assert!(!find_matches(board.grid()).is_empty());
    }
}
