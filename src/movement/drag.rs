//! Drag gestures in presentation space.
//!
//! A gesture locks to one axis the first time the pointer's displacement
//! from the gesture start has a dominant component, and keeps that axis
//! until release. Motion along the locked axis is clamped to one cell
//! towards an empty neighbour and to zero towards anything else.

use crate::error::{ActionError, GridError};
use crate::grid::{Axis, Coord, Direction, Grid, GridGeometry, ObjectId};

use super::is_draggable;

#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    id: ObjectId,
    origin: Coord,
    start: (f32, f32),
    cell_size: f32,
    /// Allowed travel per direction, indexed by `Direction::index`.
    reach: [f32; 4],
    axis: Option<Axis>,
    offset: f32,
}

impl DragGesture {
    /// Starts dragging object `id` with the pointer at `(x, y)`.
    pub fn begin(
        grid: &Grid,
        geometry: &GridGeometry,
        id: ObjectId,
        x: f32,
        y: f32,
    ) -> Result<Self, ActionError> {
        let obj = grid.get(id).ok_or(GridError::UnknownObject(id))?;
        if !is_draggable(&obj.kind) {
            return Err(ActionError::NotMovable(id));
        }
        let origin = obj.pos();
        let mut reach = [0.0; 4];
        for dir in Direction::ALL {
            if grid.is_empty(origin.step(dir)) {
                reach[dir.index()] = geometry.cell_size;
            }
        }
        Ok(DragGesture {
            id,
            origin,
            start: (x, y),
            cell_size: geometry.cell_size,
            reach,
            axis: None,
            offset: 0.0,
        })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    /// Updates the pointer position. Returns the clamped `(dx, dy)` offset
    /// of the object from its origin cell centre.
    pub fn drag_to(&mut self, x: f32, y: f32) -> (f32, f32) {
        let dx = x - self.start.0;
        let dy = y - self.start.1;
        if self.axis.is_none() {
            if dx.abs() > dy.abs() {
                self.axis = Some(Axis::Horizontal);
            } else if dy.abs() > dx.abs() {
                self.axis = Some(Axis::Vertical);
            }
        }
        self.offset = match self.axis {
            Some(Axis::Horizontal) => self.clamp(dx, Direction::Left, Direction::Right),
            Some(Axis::Vertical) => self.clamp(dy, Direction::Up, Direction::Down),
            None => 0.0,
        };
        self.offset_xy()
    }

    /// Current offset from the origin cell centre.
    pub fn offset_xy(&self) -> (f32, f32) {
        match self.axis {
            Some(Axis::Horizontal) => (self.offset, 0.0),
            Some(Axis::Vertical) => (0.0, self.offset),
            None => (0.0, 0.0),
        }
    }

    /// The cell the object would snap to if released now.
    pub fn target(&self) -> Coord {
        if self.offset.abs() <= self.cell_size / 2.0 {
            return self.origin;
        }
        let dir = match (self.axis, self.offset > 0.0) {
            (Some(Axis::Horizontal), true) => Direction::Right,
            (Some(Axis::Horizontal), false) => Direction::Left,
            (Some(Axis::Vertical), true) => Direction::Down,
            (Some(Axis::Vertical), false) => Direction::Up,
            (None, _) => return self.origin,
        };
        self.origin.step(dir)
    }

    /// Ends the gesture and returns the snapped destination cell.
    pub fn release(self) -> Coord {
        self.target()
    }

    fn clamp(&self, delta: f32, negative: Direction, positive: Direction) -> f32 {
        delta.clamp(-self.reach[negative.index()], self.reach[positive.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ObjectKind;

    fn setup() -> (Grid, ObjectId, GridGeometry) {
        let mut grid = Grid::new(3, 3);
        let id = grid
            .spawn(ObjectKind::character(Direction::Up), Coord::new(1, 1))
            .unwrap();
        grid.spawn(ObjectKind::Cactus, Coord::new(1, 2)).unwrap();
        (grid, id, GridGeometry::default())
    }

    #[test]
    fn locks_to_dominant_axis() {
        let (grid, id, geo) = setup();
        let mut g = DragGesture::begin(&grid, &geo, id, 96.0, 96.0).unwrap();
        assert_eq!(g.drag_to(96.0, 96.0), (0.0, 0.0));
        assert_eq!(g.axis(), None);
        g.drag_to(86.0, 100.0);
        assert_eq!(g.axis(), Some(Axis::Horizontal));
        // Later vertical motion stays on the locked axis.
        assert_eq!(g.drag_to(90.0, 160.0), (-6.0, 0.0));
    }

    #[test]
    fn blocked_direction_has_no_reach() {
        let (grid, id, geo) = setup();
        let mut g = DragGesture::begin(&grid, &geo, id, 96.0, 96.0).unwrap();
        assert_eq!(g.drag_to(200.0, 96.0), (0.0, 0.0));
        assert_eq!(g.release(), Coord::new(1, 1));
    }

    #[test]
    fn open_direction_clamps_to_one_cell() {
        let (grid, id, geo) = setup();
        let mut g = DragGesture::begin(&grid, &geo, id, 96.0, 96.0).unwrap();
        assert_eq!(g.drag_to(96.0, -200.0), (0.0, -64.0));
        assert_eq!(g.release(), Coord::new(0, 1));
    }

    #[test]
    fn short_drag_snaps_back() {
        let (grid, id, geo) = setup();
        let mut g = DragGesture::begin(&grid, &geo, id, 96.0, 96.0).unwrap();
        g.drag_to(96.0, 96.0 + 31.0);
        assert_eq!(g.target(), Coord::new(1, 1));
        g.drag_to(96.0, 96.0 + 33.0);
        assert_eq!(g.release(), Coord::new(2, 1));
    }

    #[test]
    fn portals_cannot_be_dragged() {
        let mut grid = Grid::new(2, 2);
        let id = grid.spawn(ObjectKind::open_portal(), Coord::new(0, 0)).unwrap();
        let geo = GridGeometry::default();
        assert_eq!(
            DragGesture::begin(&grid, &geo, id, 0.0, 0.0),
            Err(ActionError::NotMovable(id))
        );
    }
}
