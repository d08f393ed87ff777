//! Level construction.
//!
//! Builds a grid from a layout, places scattered objects with a bounded
//! random search, and generates random layouts for playouts.

use log::{debug, error};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::LevelError;
use crate::grid::{Coord, Direction, Grid, ObjectKind, Rarity, Walker};
use crate::protocol::layout::{CellCode, LevelLayout};

/// Picks a random empty cell, giving up after `max_attempts` draws.
pub fn random_empty_cell(
    grid: &Grid,
    rng: &mut impl Rng,
    max_attempts: u32,
) -> Result<Coord, LevelError> {
    if grid.rows() > 0 && grid.cols() > 0 {
        for _ in 0..max_attempts {
            let coord = Coord::new(
                rng.gen_range(0..grid.rows()) as i32,
                rng.gen_range(0..grid.cols()) as i32,
            );
            if grid.is_empty(coord) {
                return Ok(coord);
            }
        }
    }
    Err(LevelError::MaxIterationsExceeded {
        attempts: max_attempts,
    })
}

fn random_facing(rng: &mut impl Rng) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

/// Builds the initial grid for `layout`. Objects from the matrix are
/// spawned in row-major order, then scattered objects are placed.
pub fn build_grid(
    layout: &LevelLayout,
    rng: &mut impl Rng,
    max_attempts: u32,
) -> Result<Grid, LevelError> {
    layout.validate()?;
    let mut grid = Grid::new(layout.rows(), layout.cols());

    for (row, cells) in layout.cells.iter().enumerate() {
        for (col, &code) in cells.iter().enumerate() {
            let coord = Coord::new(row as i32, col as i32);
            let Some(cell) = CellCode::from_code(code) else {
                continue;
            };
            let mut facing = || layout.facing_at(row, col).unwrap_or_else(|| random_facing(rng));
            let kind = match cell {
                CellCode::Inactive => {
                    grid.set_active(coord, false)?;
                    continue;
                }
                CellCode::Empty => continue,
                CellCode::Character => ObjectKind::character(facing()),
                CellCode::BurntCharacter => ObjectKind::Character(Walker::burnt(facing())),
                CellCode::Rofl(rarity) => ObjectKind::rofl(facing(), rarity),
                CellCode::Portal => ObjectKind::open_portal(),
                CellCode::Milkshake => ObjectKind::Milkshake,
                CellCode::Grenade => ObjectKind::live_grenade(),
                CellCode::Cactus => ObjectKind::Cactus,
            };
            grid.spawn(kind, coord)?;
        }
    }

    let scatter = layout.scatter;
    let extras = std::iter::repeat(ObjectKind::character(Direction::Up))
        .take(scatter.characters as usize)
        .chain(std::iter::repeat(ObjectKind::live_grenade()).take(scatter.grenades as usize))
        .chain(std::iter::repeat(ObjectKind::Milkshake).take(scatter.milkshakes as usize))
        .chain(std::iter::repeat(ObjectKind::Cactus).take(scatter.cacti as usize));
    for mut kind in extras {
        if let Some(walker) = kind.walker_mut() {
            walker.facing = random_facing(rng);
        }
        let coord = random_empty_cell(&grid, rng, max_attempts)?;
        grid.spawn(kind, coord)?;
    }

    debug!(
        "built {}x{} grid with {} objects",
        grid.rows(),
        grid.cols(),
        grid.object_count()
    );
    Ok(grid)
}

/// Object counts for a generated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenParams {
    pub rows: usize,
    pub cols: usize,
    pub actions: u32,
    pub portals: usize,
    pub characters: usize,
    pub rofls: usize,
    pub grenades: usize,
    pub milkshakes: usize,
    pub cacti: usize,
    /// Cells knocked out of the footprint.
    pub inactive: usize,
}

impl Default for GenParams {
    fn default() -> Self {
        GenParams {
            rows: 6,
            cols: 6,
            actions: 8,
            portals: 1,
            characters: 6,
            rofls: 1,
            grenades: 2,
            milkshakes: 2,
            cacti: 2,
            inactive: 3,
        }
    }
}

/// Generates a random layout. Fails if the requested objects do not fit.
pub fn generate_layout(params: &GenParams, rng: &mut impl Rng) -> Result<LevelLayout, LevelError> {
    let area = params.rows * params.cols;
    let mut codes: Vec<u8> = Vec::with_capacity(area);
    codes.extend(std::iter::repeat(CellCode::Portal.code()).take(params.portals));
    codes.extend(std::iter::repeat(CellCode::Character.code()).take(params.characters));
    for _ in 0..params.rofls {
        let rarity = Rarity::ALL[rng.gen_range(0..Rarity::ALL.len())];
        codes.push(CellCode::Rofl(rarity).code());
    }
    codes.extend(std::iter::repeat(CellCode::Grenade.code()).take(params.grenades));
    codes.extend(std::iter::repeat(CellCode::Milkshake.code()).take(params.milkshakes));
    codes.extend(std::iter::repeat(CellCode::Cactus.code()).take(params.cacti));
    codes.extend(std::iter::repeat(CellCode::Inactive.code()).take(params.inactive));
    if area == 0 || codes.len() > area {
        error!(
            "cannot fit {} objects into a {}x{} level",
            codes.len(),
            params.rows,
            params.cols
        );
        return Err(LevelError::MaxIterationsExceeded {
            attempts: area as u32,
        });
    }
    codes.resize(area, CellCode::Empty.code());
    codes.shuffle(rng);

    let cells = codes.chunks(params.cols).map(<[u8]>::to_vec).collect();
    let mut layout = LevelLayout::from_cells(params.actions, cells);
    layout.name = format!("generated {}x{}", params.rows, params.cols);
    Ok(layout)
}
