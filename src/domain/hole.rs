/// Hole lifecycle: a dug brick waiting to be restored.
///
/// `Hole::dig` empties the brick; the caller schedules the returned hole
/// with `HOLE_DELAY`. When the scheduled event fires, `refill` turns the
/// cell back into Brick. Anything standing in the cell at that moment is
/// crushed on its next crush check.

use crate::sim::event::{AudioCue, GameEvent};

use super::grid::Grid;
use super::tile::Tile;

/// Frames between digging a hole and its refill.
pub const HOLE_DELAY: u32 = 350;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hole {
    pub x: usize,
    pub y: usize,
}

impl Hole {
    /// Empty the brick at `(x, y)`. The cell must currently be Brick.
    pub fn dig(x: usize, y: usize, grid: &mut Grid, events: &mut Vec<GameEvent>) -> Hole {
        debug_assert_eq!(grid.tile_at(x, y), Tile::Brick, "digging a non-brick at ({x}, {y})");
        grid.set_tile(x, y, Tile::Empty);
        events.push(GameEvent::TileCleared { x, y });
        events.push(GameEvent::Cue(AudioCue::Dig));
        log::debug!("hole dug at ({x}, {y})");
        Hole { x, y }
    }

    /// Restore the brick.
    pub fn refill(self, grid: &mut Grid, events: &mut Vec<GameEvent>) {
        grid.set_tile(self.x, self.y, Tile::Brick);
        events.push(GameEvent::TileDrawn { x: self.x, y: self.y, tile: Tile::Brick });
        log::debug!("hole refilled at ({}, {})", self.x, self.y);
    }
}
