//! Grid occupancy table.
//!
//! Owns every cell and every object placed on it. All occupancy changes go
//! through `spawn`, `place`, and `vacate`, which keep each cell's occupant
//! and the occupant's cached position in agreement.

use crate::error::GridError;

use super::coord::Coord;
use super::object::{GridObject, ObjectId, ObjectKind};

/// Result of looking up a cell.
///
/// Callers must distinguish "no such cell" from "cell exists but is not
/// playable" from "cell is free", so this is not an `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    OutOfBounds,
    Inactive,
    Empty,
    Object(ObjectId),
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub coord: Coord,
    pub active: bool,
    occupant: Option<ObjectId>,
}

impl Cell {
    pub fn occupant(&self) -> Option<ObjectId> {
        self.occupant
    }
}

/// A fixed-size `rows x cols` grid of cells and the objects placed on them.
///
/// Objects live in an id-indexed slab; removing an object leaves a hole so
/// ids are never reused within one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    objects: Vec<Option<GridObject>>,
    live: usize,
}

impl Grid {
    /// Creates a grid with every cell active and empty.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell {
                    coord: Coord::new(row as i32, col as i32),
                    active: true,
                    occupant: None,
                });
            }
        }
        Grid {
            rows,
            cols,
            cells,
            objects: Vec::new(),
            live: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn cell_index(&self, coord: Coord) -> Option<usize> {
        if self.is_within_bounds(coord) {
            Some(coord.row as usize * self.cols + coord.col as usize)
        } else {
            None
        }
    }

    pub fn is_within_bounds(&self, coord: Coord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.rows
            && (coord.col as usize) < self.cols
    }

    /// True if the cell exists and belongs to the playable footprint.
    pub fn is_active(&self, coord: Coord) -> bool {
        self.cell_index(coord).is_some_and(|i| self.cells[i].active)
    }

    /// True iff the cell is in bounds, active, and unoccupied.
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.object_at(coord) == Lookup::Empty
    }

    pub fn object_at(&self, coord: Coord) -> Lookup {
        let Some(i) = self.cell_index(coord) else {
            return Lookup::OutOfBounds;
        };
        let cell = &self.cells[i];
        if !cell.active {
            return Lookup::Inactive;
        }
        match cell.occupant {
            Some(id) => Lookup::Object(id),
            None => Lookup::Empty,
        }
    }

    /// Returns the object in `coord`, if any.
    pub fn object_in(&self, coord: Coord) -> Option<&GridObject> {
        match self.object_at(coord) {
            Lookup::Object(id) => self.get(id),
            Lookup::OutOfBounds | Lookup::Inactive | Lookup::Empty => None,
        }
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cell_index(coord).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Marks a cell as inside or outside the playable footprint.
    /// An occupied cell cannot be deactivated.
    pub fn set_active(&mut self, coord: Coord, active: bool) -> Result<(), GridError> {
        let i = self.cell_index(coord).ok_or(GridError::OutOfBounds(coord))?;
        if !active && self.cells[i].occupant.is_some() {
            return Err(GridError::CellOccupied(coord));
        }
        self.cells[i].active = active;
        Ok(())
    }

    pub fn get(&self, id: ObjectId) -> Option<&GridObject> {
        self.objects.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutable access to an object. Its position stays read-only; use
    /// `place` to move it.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GridObject> {
        self.objects.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Iterates live objects in ascending id order.
    pub fn objects(&self) -> impl Iterator<Item = &GridObject> {
        self.objects.iter().filter_map(Option::as_ref)
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut GridObject> {
        self.objects.iter_mut().filter_map(Option::as_mut)
    }

    /// Number of objects currently on the grid.
    pub fn object_count(&self) -> usize {
        self.live
    }

    /// One past the highest id ever issued; sizes id-indexed tables.
    pub fn id_bound(&self) -> usize {
        self.objects.len()
    }

    /// Creates a new object in an empty cell.
    pub fn spawn(&mut self, kind: ObjectKind, coord: Coord) -> Result<ObjectId, GridError> {
        let i = self.checked_target(coord)?;
        if self.cells[i].occupant.is_some() {
            return Err(GridError::CellOccupied(coord));
        }
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(Some(GridObject::new(id, coord, kind)));
        self.cells[i].occupant = Some(id);
        self.live += 1;
        Ok(id)
    }

    /// Moves an existing object to `coord`.
    ///
    /// Placing an object onto its own cell is a no-op. Fails without any
    /// change if the destination is unplayable or held by another object.
    pub fn place(&mut self, id: ObjectId, coord: Coord) -> Result<(), GridError> {
        let from = self.get(id).ok_or(GridError::UnknownObject(id))?.pos();
        let to_idx = self.checked_target(coord)?;
        match self.cells[to_idx].occupant {
            Some(other) if other == id => return Ok(()),
            Some(_) => return Err(GridError::CellOccupied(coord)),
            None => {}
        }
        if let Some(from_idx) = self.cell_index(from) {
            self.cells[from_idx].occupant = None;
        }
        self.cells[to_idx].occupant = Some(id);
        if let Some(obj) = self.get_mut(id) {
            obj.set_pos(coord);
        }
        Ok(())
    }

    /// Clears a cell, removing its occupant from the grid entirely.
    pub fn vacate(&mut self, coord: Coord) -> Option<GridObject> {
        let i = self.cell_index(coord)?;
        let id = self.cells[i].occupant.take()?;
        let removed = self.objects.get_mut(id.index()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// In-bounds cells of the 3x3 block around `coord`, including `coord`.
    pub fn neighborhood(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        coord.block().filter(move |c| self.is_within_bounds(*c))
    }

    /// Verifies that every occupied cell and its occupant agree on position
    /// and that no object is orphaned.
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut seen = 0usize;
        for cell in &self.cells {
            let Some(id) = cell.occupant else { continue };
            let obj = self
                .get(id)
                .ok_or_else(|| format!("cell {} references missing object {}", cell.coord, id))?;
            if obj.pos() != cell.coord {
                return Err(format!(
                    "object {} caches {} but sits in {}",
                    id,
                    obj.pos(),
                    cell.coord
                ));
            }
            if !cell.active {
                return Err(format!("object {} sits in inactive cell {}", id, cell.coord));
            }
            seen += 1;
        }
        if seen != self.live {
            return Err(format!("{} objects placed but {} live", seen, self.live));
        }
        Ok(())
    }

    fn checked_target(&self, coord: Coord) -> Result<usize, GridError> {
        match self.cell_index(coord) {
            Some(i) if self.cells[i].active => Ok(i),
            _ => Err(GridError::OutOfBounds(coord)),
        }
    }
}
