use std::collections::BTreeMap;
use std::fmt;

use crate::error::GameError;

pub const COLS: usize = 5;
pub const ROWS: usize = 3;

/// Points awarded for every occupied slot.
pub const SLOT_SCORE: u32 = 30;

/// A team marker occupying board slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Marker {
    Red,
    Blue,
}

impl Marker {
    /// Get the opposing marker
    pub fn other(self) -> Marker {
        match self {
            Marker::Red => Marker::Blue,
            Marker::Blue => Marker::Red,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Marker::Red => Cell::Red,
            Marker::Blue => Cell::Blue,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Marker::Red => "Red",
            Marker::Blue => "Blue",
        }
    }

    /// Single-letter form used when rendering the board.
    pub fn letter(self) -> char {
        match self {
            Marker::Red => 'r',
            Marker::Blue => 'b',
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Blue,
}

impl Cell {
    pub fn marker(self) -> Option<Marker> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Marker::Red),
            Cell::Blue => Some(Marker::Blue),
        }
    }
}

/// Terminal state of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    Draw,
    Win(Marker),
}

/// The 5-column silo rack. Each column holds up to three slots, indexed
/// bottom-up: slot 0 is the bottom, slot 2 the top. Columns fill bottom-up
/// with no gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    slots: [[Cell; ROWS]; COLS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            slots: [[Cell::Empty; ROWS]; COLS],
        }
    }

    /// Build a board from a sensor grid of 5 columns x 3 rows.
    pub fn from_grid(values: &[Vec<Cell>]) -> Result<Self, GameError> {
        if values.len() != COLS {
            return Err(GameError::BadColumnCount(values.len()));
        }
        let mut board = Board::new();
        for (col, column) in values.iter().enumerate() {
            if column.len() != ROWS {
                return Err(GameError::BadRowCount {
                    column: col,
                    rows: column.len(),
                });
            }
            for (row, &cell) in column.iter().enumerate() {
                board.slots[col][row] = cell;
            }
        }
        Ok(board)
    }

    /// Get the cell at a position. Row 0 is the bottom, row 2 the top.
    pub fn get(&self, col: usize, row: usize) -> Cell {
        self.slots[col][row]
    }

    /// Check if a column has no room left. Out-of-range columns count as
    /// full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.slots[col][ROWS - 1] != Cell::Empty
    }

    /// Columns whose top slot is still empty.
    pub fn available_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// Drop a marker into the lowest empty slot of a column, searching
    /// upward from slot 0. Returns the landing row, or `None` if the
    /// column is full or out of range — callers are expected to have
    /// checked availability already.
    pub fn place(&mut self, col: usize, marker: Marker) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        for row in 0..ROWS {
            if self.slots[col][row] == Cell::Empty {
                self.slots[col][row] = marker.to_cell();
                return Some(row);
            }
        }
        None
    }

    /// Canonical encoding of the board from one side's perspective: +1 for
    /// the owner's slots, -1 for the opponent's, 0 for empty. Identical
    /// boards always yield identical hashes for the same owner.
    pub fn hash(&self, owner: Marker) -> String {
        let mut encoded = [[0i8; ROWS]; COLS];
        for col in 0..COLS {
            for row in 0..ROWS {
                encoded[col][row] = match self.slots[col][row].marker() {
                    Some(m) if m == owner => 1,
                    Some(_) => -1,
                    None => 0,
                };
            }
        }
        format!("{encoded:?}")
    }

    /// Score per marker: 30 points per occupied slot. Markers that placed
    /// nothing are absent from the map, which reward computation relies on.
    pub fn score_by_marker(&self) -> BTreeMap<Marker, u32> {
        let mut scores = BTreeMap::new();
        for col in 0..COLS {
            for row in 0..ROWS {
                if let Some(marker) = self.slots[col][row].marker() {
                    *scores.entry(marker).or_insert(0) += SLOT_SCORE;
                }
            }
        }
        scores
    }

    /// Decide the terminal state.
    ///
    /// A marker owning three or more top slots becomes the candidate; it
    /// wins once three of its topped columns are "secured" (the marker also
    /// holds at least one of the two slots beneath the top). Without a
    /// winner the game is a draw iff every top slot is occupied.
    pub fn outcome(&self) -> Outcome {
        let mut full_top = true;
        let mut top_counts: BTreeMap<Marker, u32> = BTreeMap::new();
        let mut candidate = None;

        for col in 0..COLS {
            match self.slots[col][ROWS - 1].marker() {
                Some(marker) => {
                    let count = top_counts.entry(marker).or_insert(0);
                    *count += 1;
                    if *count >= 3 {
                        candidate = Some(marker);
                    }
                }
                None => full_top = false,
            }
        }

        let Some(candidate) = candidate else {
            return if full_top { Outcome::Draw } else { Outcome::Ongoing };
        };

        let mut secured = 0;
        for col in 0..COLS {
            if self.slots[col][ROWS - 1] != candidate.to_cell() {
                continue;
            }
            if self.slots[col][..ROWS - 1]
                .iter()
                .any(|&slot| slot == candidate.to_cell())
            {
                secured += 1;
            }
            if secured >= 3 {
                return Outcome::Win(candidate);
            }
        }

        if full_top {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            for col in 0..COLS {
                let c = match self.slots[col][row].marker() {
                    Some(m) => m.letter(),
                    None => ' ',
                };
                write!(f, "|{c}| ")?;
            }
            writeln!(f)?;
            for _ in 0..COLS {
                write!(f, "--- ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
