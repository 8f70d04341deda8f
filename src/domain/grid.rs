/// Grid: the runtime tile layer of a level.
///
/// Tiles are stored row-major in one flat array (`len == width * height`).
/// The only write path is `set_tile()`; dig, refill and gold pickup all go
/// through it.
///
/// Bounds are not checked on access. Callers guard with `in_bounds()` /
/// `offset()` first; an out-of-range index is a bug and trips a debug
/// assertion (or a slice panic past the end of the array).

use super::tile::Tile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Build a grid from row-major tiles.
    /// Panics if `tiles.len() != width * height`.
    pub fn new(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        assert_eq!(
            tiles.len(), width * height,
            "grid of {}x{} needs {} tiles, got {}",
            width, height, width * height, tiles.len(),
        );
        Grid { width, height, tiles }
    }

    /// Index of the bottom row.
    pub fn bottom(&self) -> usize { self.height - 1 }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// `(x + dx, y + dy)` if that cell is inside the grid.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, dx: i32, dy: i32) -> Option<(usize, usize)> {
        let tx = x as i32 + dx;
        let ty = y as i32 + dy;
        if self.in_bounds(tx, ty) {
            Some((tx as usize, ty as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        self.tiles[self.index(x, y)]
    }

    #[inline]
    pub fn set_tile(&mut self, x: usize, y: usize, tile: Tile) {
        let i = self.index(x, y);
        self.tiles[i] = tile;
    }

    /// Is there at least one tile of this kind anywhere?
    pub fn contains(&self, tile: Tile) -> bool {
        self.tiles.contains(&tile)
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Positions of every tile of this kind, in row-major order.
    pub fn positions_of(&self, tile: Tile) -> Vec<(usize, usize)> {
        self.tiles.iter()
            .enumerate()
            .filter(|(_, &t)| t == tile)
            .map(|(i, _)| (i % self.width, i / self.width))
            .collect()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "tile ({x}, {y}) outside {}x{} grid", self.width, self.height,
        );
        x + y * self.width
    }
}
