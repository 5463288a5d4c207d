use match3_protocol::Cell;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GemType {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl GemType {
    pub const ALL: [GemType; 6] = [
        GemType::Red,
        GemType::Blue,
        GemType::Green,
        GemType::Yellow,
        GemType::Purple,
        GemType::Orange,
    ];

    /// Uniform draw from the first `type_count` kinds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, type_count: u8) -> Self {
        let count = (type_count as usize).clamp(1, Self::ALL.len());
        Self::ALL[rng.gen_range(0..count)]
    }

    pub fn index(self) -> usize {
        match self {
            GemType::Red => 0,
            GemType::Blue => 1,
            GemType::Green => 2,
            GemType::Yellow => 3,
            GemType::Purple => 4,
            GemType::Orange => 5,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            GemType::Red => 'R',
            GemType::Blue => 'B',
            GemType::Green => 'G',
            GemType::Yellow => 'Y',
            GemType::Purple => 'P',
            GemType::Orange => 'O',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|gem| gem.symbol() == c.to_ascii_uppercase())
    }
}

/// Stable identity of a tile for its whole lifetime on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance of exactly one.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<Cell> for Position {
    fn from(cell: Cell) -> Self {
        Self::new(cell.row, cell.col)
    }
}

impl From<Position> for Cell {
    fn from(pos: Position) -> Self {
        Cell {
            row: pos.row,
            col: pos.col,
        }
    }
}

/// A gem on the board. Coordinates are owned by the grid and only change
/// through grid mutations, so they always agree with the tile's cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub gem: GemType,
    row: usize,
    col: usize,
    matched: bool,
}

impl Tile {
    pub(crate) fn new(id: TileId, gem: GemType, pos: Position) -> Self {
        Self {
            id,
            gem,
            row: pos.row,
            col: pos.col,
            matched: false,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub(crate) fn set_position(&mut self, pos: Position) {
        self.row = pos.row;
        self.col = pos.col;
    }

    pub(crate) fn mark_matched(&mut self) {
        self.matched = true;
    }
}

/// Where a consumed tile was and what it was, as reported to collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedTile {
    pub row: usize,
    pub col: usize,
    #[serde(rename = "type")]
    pub gem: GemType,
}

impl From<&Tile> for MatchedTile {
    fn from(tile: &Tile) -> Self {
        Self {
            row: tile.row,
            col: tile.col,
            gem: tile.gem,
        }
    }
}
