use serde::Serialize;

// A single board cell. Serialized as a two element array: [x, y]
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell(pub i64, pub i64);

// A ship as submitted by a client: an ordered list of coordinates.
// Coordinates are kept raw, entries with less than two components are ignored when the board is derived.
pub type Ship = Vec<Vec<i64>>;

// The cells still occupied by a player's ships. It's a multiset: overlapping ships
// put the same cell on the board twice and each occurrence needs its own hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {

    // Flatten a ship layout into the occupied cells. No shape or bounds checks are done.
    pub fn from_ships(ships: &[Ship]) -> Self {
        let cells = ships
            .iter()
            .flatten()
            .filter(|coord| coord.len() >= 2)
            .map(|coord| Cell(coord[0], coord[1]))
            .collect();
        Board { cells }
    }

    // Removes one occurrence of the cell. Returns false when the cell was not occupied.
    pub fn remove_hit(&mut self, cell: Cell) -> bool {
        match self.cells.iter().position(|c| *c == cell) {
            Some(index) => {
                self.cells.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
