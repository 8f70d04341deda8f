/// Movement, fall and dig rules — truth-table driven.
///
/// Pure functions over the grid. These encode "what is legal" without
/// performing the action; `physics` applies them.
///
/// Every rule looks at two tiles only: the tile the entity is on (`here`)
/// and the tile it wants to enter (`target`) or the tile below it.
///
/// ## Movement Truth Table
///
/// ### Horizontal (Left / Right)
/// ┌──────────────────────┬───────────────┬─────────────────┐
/// │ Condition            │ Allow?        │ Notes           │
/// ├──────────────────────┼───────────────┼─────────────────┤
/// │ Dest out of bounds   │ DENY          │ map edge        │
/// │ Dest tile Brick      │ DENY          │                 │
/// │ Otherwise            │ ALLOW         │ no floor needed │
/// └──────────────────────┴───────────────┴─────────────────┘
///
/// ### Up
/// ┌──────────────────────┬───────────────┬─────────────────┐
/// │ Dest out of bounds   │ DENY          │ top edge        │
/// │ here NOT climbable   │ DENY          │ Ladder / Hidden │
/// │ Dest tile Brick      │ DENY          │                 │
/// │ Otherwise            │ ALLOW         │                 │
/// └──────────────────────┴───────────────┴─────────────────┘
///
/// ### Down
/// ┌──────────────────────┬───────────────┬─────────────────┐
/// │ Dest out of bounds   │ DENY          │ bottom edge     │
/// │ Dest tile Brick      │ DENY          │                 │
/// │ Otherwise            │ ALLOW         │ any tile here   │
/// └──────────────────────┴───────────────┴─────────────────┘
///
/// A zero delta `(0, 0)` is accepted and leaves the position unchanged.
///
/// ### Falling
/// ┌──────────────────────────────┬───────────┐
/// │ Condition                    │ Falls?    │
/// ├──────────────────────────────┼───────────┤
/// │ On the bottom row            │ NO        │
/// │ here is not Empty            │ NO        │ (rope, ladder, gold: hold)
/// │ below is Empty / Rope / Gold │ YES       │
/// │ Otherwise                    │ NO        │
/// └──────────────────────────────┴───────────┘
///
/// ### Dig (side = Left / Right)
/// ┌──────────────────────────────┬───────────┐
/// │ Digger on bottom row         │ DENY      │
/// │ Target (x+side, y+1) outside │ DENY      │
/// │ Target not Brick             │ DENY      │
/// │ Digger's own tile not Empty  │ DENY      │ (ladder, rope, gold)
/// │ Otherwise                    │ ALLOW     │
/// └──────────────────────────────┴───────────┘

use super::entity::Facing;
use super::grid::Grid;
use super::tile::Tile;

// ── Movement ──

/// Is a step from `(x, y)` by `(dx, dy)` legal? Returns the target cell.
pub fn can_move(grid: &Grid, x: usize, y: usize, dx: i32, dy: i32) -> Option<(usize, usize)> {
    debug_assert!(dx == 0 || dy == 0, "diagonal step ({dx}, {dy})");
    debug_assert!(dx.abs() <= 1 && dy.abs() <= 1, "step ({dx}, {dy}) longer than one tile");

    let (tx, ty) = grid.offset(x, y, dx, dy)?;
    let here = grid.tile_at(x, y);
    let target = grid.tile_at(tx, ty);

    if dx != 0 && target.is_solid() { return None; }
    if dy > 0 && target.is_solid() { return None; }
    if dy < 0 && (!here.is_climbable() || target.is_solid()) { return None; }

    Some((tx, ty))
}

// ── Falling ──

/// Should an entity at `(x, y)` drop one row?
pub fn should_fall(grid: &Grid, x: usize, y: usize) -> bool {
    if y >= grid.bottom() { return false; }
    let here = grid.tile_at(x, y);
    if here.is_hangable() { return false; }
    here == Tile::Empty && grid.tile_at(x, y + 1).is_fall_through()
}

// ── Crushing ──

/// An entity whose own cell has turned back into Brick is crushed.
pub fn is_crushed(grid: &Grid, x: usize, y: usize) -> bool {
    grid.tile_at(x, y).is_solid()
}

// ── Dig ──

/// Can an entity at `(x, y)` dig toward `side`? Returns the brick to remove.
pub fn can_dig(grid: &Grid, x: usize, y: usize, side: Facing) -> Option<(usize, usize)> {
    if y >= grid.bottom() { return None; }
    let (tx, ty) = grid.offset(x, y, side.dx(), 1)?;
    if !grid.tile_at(tx, ty).is_diggable() { return None; }
    if grid.tile_at(x, y) != Tile::Empty { return None; }
    Some((tx, ty))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
