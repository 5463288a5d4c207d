use std::fmt;

use crate::tile::{GemType, Position, Tile, TileId};

/// Authoritative rows x cols storage of tiles. Every mutation keeps the
/// stored tile's coordinates equal to the cell holding it.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Option<Tile>>>,
    next_id: u64,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![None; cols]; rows],
            next_id: 0,
        }
    }

    /// Build a grid from symbol rows such as `"RGB.Y"`; `.` is an empty cell.
    /// Returns `None` for ragged input or unknown symbols.
    pub fn from_symbols(lines: &[&str]) -> Option<Self> {
        let rows = lines.len();
        let cols = lines.first().map_or(0, |line| line.chars().count());
        let mut grid = Self::new(rows, cols);

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return None;
            }
            for (col, c) in line.chars().enumerate() {
                if c == '.' {
                    continue;
                }
                let gem = GemType::from_symbol(c)?;
                grid.spawn(Position::new(row, col), gem);
            }
        }
        Some(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Tile at the cell, or `None` for an empty or out-of-bounds cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&Tile> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    pub fn at(&self, pos: Position) -> Option<&Tile> {
        self.get(pos.row, pos.col)
    }

    pub fn gem_at(&self, row: usize, col: usize) -> Option<GemType> {
        self.get(row, col).map(|tile| tile.gem)
    }

    /// Create a fresh tile in an empty cell.
    pub fn spawn(&mut self, pos: Position, gem: GemType) -> Tile {
        assert!(self.in_bounds(pos), "spawn outside the grid at {:?}", pos);
        assert!(
            self.cells[pos.row][pos.col].is_none(),
            "spawn into occupied cell {:?}",
            pos
        );

        let tile = Tile::new(TileId(self.next_id), gem, pos);
        self.next_id += 1;
        self.cells[pos.row][pos.col] = Some(tile);
        tile
    }

    pub fn remove(&mut self, pos: Position) -> Option<Tile> {
        self.cells.get_mut(pos.row)?.get_mut(pos.col)?.take()
    }

    /// Move a tile into an empty cell. Returns the moved tile.
    pub fn move_tile(&mut self, from: Position, to: Position) -> Option<Tile> {
        if !self.in_bounds(to) || self.at(to).is_some() {
            return None;
        }
        let mut tile = self.remove(from)?;
        tile.set_position(to);
        self.cells[to.row][to.col] = Some(tile);
        Some(tile)
    }

    /// Exchange the contents of two cells, updating both tiles' coordinates.
    pub fn swap(&mut self, a: Position, b: Position) {
        if a == b || !self.in_bounds(a) || !self.in_bounds(b) {
            return;
        }
        let mut first = self.cells[a.row][a.col].take();
        let mut second = self.cells[b.row][b.col].take();
        if let Some(tile) = first.as_mut() {
            tile.set_position(b);
        }
        if let Some(tile) = second.as_mut() {
            tile.set_position(a);
        }
        self.cells[a.row][a.col] = second;
        self.cells[b.row][b.col] = first;
    }

    pub(crate) fn mark_matched(&mut self, pos: Position) {
        if let Some(tile) = self
            .cells
            .get_mut(pos.row)
            .and_then(|row| row.get_mut(pos.col))
            .and_then(Option::as_mut)
        {
            tile.mark_matched();
        }
    }

    /// Row-major iteration over occupied cells.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten().flatten()
    }

    pub fn empty_cells(&self) -> usize {
        self.rows * self.cols - self.tiles().count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_cells() == 0
    }

    pub fn clear(&mut self) {
        for row in self.cells.iter_mut() {
            row.fill(None);
        }
    }

    /// Identity and kind of every cell, for comparing grid states tile for tile.
    pub fn snapshot(&self) -> Vec<Vec<Option<(TileId, GemType)>>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.map(|t| (t.id, t.gem))).collect())
            .collect()
    }

    /// Panics if any tile's stored coordinates disagree with its cell,
    /// or if a tile identity appears twice.
    pub fn assert_consistent(&self) {
        let mut seen = std::collections::HashSet::new();
        for (row, cells) in self.cells.iter().enumerate() {
            assert_eq!(cells.len(), self.cols, "row {} has wrong width", row);
            for (col, cell) in cells.iter().enumerate() {
                if let Some(tile) = cell {
                    assert_eq!(
                        tile.position(),
                        Position::new(row, col),
                        "tile {:?} desynced from its cell",
                        tile.id
                    );
                    assert!(seen.insert(tile.id), "tile {:?} stored twice", tile.id);
                }
            }
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let c = cell.map_or('.', |tile| tile.gem.symbol());
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}
