/// Entities: the shared Body shape, Player and Baddie.
///
/// Both kinds are a `Body` plus their own state. Neither owns the grid or
/// the scheduler; every operation borrows what it needs from the `World`.

use crate::sim::event::{AudioCue, GameEvent};

use super::grid::Grid;
use super::hole::Hole;
use super::rules;
use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn dx(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// Sprite identity used in events sent to the presentation layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Actor {
    Player,
    Baddie(usize),
}

/// Position and per-move falling flag shared by every entity.
/// Movement and the falling cascade live in `physics`.
#[derive(Clone, Debug)]
pub struct Body {
    pub actor: Actor,
    pub x: usize,
    pub y: usize,
    /// Set when the most recent `step` ended in a fall.
    pub fell: bool,
}

impl Body {
    pub fn new(actor: Actor, x: usize, y: usize) -> Self {
        Body { actor, x, y, fell: false }
    }

    pub fn pos(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn same_cell(&self, other: &Body) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Is this body's own cell Brick?
    pub fn is_crushed(&self, grid: &Grid) -> bool {
        rules::is_crushed(grid, self.x, self.y)
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
}

impl Player {
    pub fn new(x: usize, y: usize) -> Self {
        Player { body: Body::new(Actor::Player, x, y) }
    }

    /// Row 0 is the exit row.
    pub fn at_exit(&self) -> bool {
        self.body.y == 0
    }

    pub fn is_crushed(&self, grid: &Grid) -> bool {
        self.body.is_crushed(grid)
    }

    /// Take the gold under the player, if any.
    /// Returns true when the grid holds no gold afterwards.
    pub fn pickup_gold(&self, grid: &mut Grid, events: &mut Vec<GameEvent>) -> bool {
        let (x, y) = self.body.pos();
        if grid.tile_at(x, y).is_gold() {
            grid.set_tile(x, y, Tile::Empty);
            events.push(GameEvent::TileCleared { x, y });
            events.push(GameEvent::Cue(AudioCue::Gold));
            log::debug!("gold taken at ({x}, {y})");
        }
        !grid.contains(Tile::Gold)
    }

    /// Dig the brick diagonally below on `side`.
    /// Returns the hole to schedule for refill, or None if digging is not legal here.
    pub fn dig(&self, side: Facing, grid: &mut Grid, events: &mut Vec<GameEvent>) -> Option<Hole> {
        let (x, y) = self.body.pos();
        let (tx, ty) = rules::can_dig(grid, x, y, side)?;
        Some(Hole::dig(tx, ty, grid, events))
    }
}

// ── Baddie ──

/// Baddie state machine: Alive → Crushed (terminal).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BaddieState {
    Alive,
    Crushed,
}

#[derive(Clone, Debug)]
pub struct Baddie {
    pub id: usize,
    pub body: Body,
    pub state: BaddieState,
}

impl Baddie {
    pub fn new(id: usize, x: usize, y: usize) -> Self {
        Baddie {
            id,
            body: Body::new(Actor::Baddie(id), x, y),
            state: BaddieState::Alive,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == BaddieState::Alive
    }

    /// Move to Crushed if a refilled brick now occupies this cell.
    /// Returns true if the baddie is (now or already) crushed.
    pub fn check_crushed(&mut self, grid: &Grid, events: &mut Vec<GameEvent>) -> bool {
        if self.state == BaddieState::Crushed { return true; }
        if !self.body.is_crushed(grid) { return false; }
        self.state = BaddieState::Crushed;
        events.push(GameEvent::SpriteRemoved { actor: self.body.actor });
        log::info!("baddie {} crushed at ({}, {})", self.id, self.body.x, self.body.y);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;

    #[test]
    fn exit_is_row_zero() {
        assert!(Player::new(3, 0).at_exit());
        assert!(!Player::new(3, 1).at_exit());
    }

    #[test]
    fn pickup_last_gold_reports_none_left() {
        let mut g = grid_from(&[
            " $ ",
            "###",
        ]);
        let p = Player::new(1, 0);
        let mut ev = vec![];
        assert!(p.pickup_gold(&mut g, &mut ev));
        assert_eq!(g.tile_at(1, 0), Tile::Empty);
        assert!(matches!(ev[0], GameEvent::TileCleared { x: 1, y: 0 }));
        assert!(matches!(ev[1], GameEvent::Cue(AudioCue::Gold)));
    }

    #[test]
    fn pickup_with_gold_elsewhere() {
        let mut g = grid_from(&[
            " $$",
            "###",
        ]);
        let p = Player::new(1, 0);
        let mut ev = vec![];
        assert!(!p.pickup_gold(&mut g, &mut ev));
        assert_eq!(g.tile_at(2, 0), Tile::Gold);
    }

    #[test]
    fn pickup_on_empty_is_silent() {
        let mut g = grid_from(&[
            "  $",
            "###",
        ]);
        let p = Player::new(0, 0);
        let mut ev = vec![];
        assert!(!p.pickup_gold(&mut g, &mut ev));
        assert!(ev.is_empty());
    }

    #[test]
    fn dig_success_clears_brick() {
        let mut g = grid_from(&[
            "   ",
            "###",
        ]);
        let p = Player::new(1, 0);
        let mut ev = vec![];
        let hole = p.dig(Facing::Right, &mut g, &mut ev).expect("dig should succeed");
        assert_eq!((hole.x, hole.y), (2, 1));
        assert_eq!(g.tile_at(2, 1), Tile::Empty);
        assert!(matches!(ev[0], GameEvent::TileCleared { x: 2, y: 1 }));
        assert!(matches!(ev[1], GameEvent::Cue(AudioCue::Dig)));
    }

    #[test]
    fn dig_failure_changes_nothing() {
        let mut g = grid_from(&[
            " H ",
            "###",
        ]);
        let before = g.clone();
        let p = Player::new(1, 0);
        let mut ev = vec![];
        assert!(p.dig(Facing::Left, &mut g, &mut ev).is_none());
        assert_eq!(g, before);
        assert!(ev.is_empty());
    }

    #[test]
    fn player_crushed_inside_brick() {
        let mut g = grid_from(&[
            "   ",
            "###",
        ]);
        let p = Player::new(1, 0);
        assert!(!p.is_crushed(&g));
        g.set_tile(1, 0, Tile::Brick);
        assert!(p.is_crushed(&g));
    }

    #[test]
    fn baddie_crush_is_terminal_and_reported_once() {
        let mut g = grid_from(&[
            "   ",
            "###",
        ]);
        let mut b = Baddie::new(0, 1, 1);
        g.set_tile(1, 1, Tile::Empty);
        let mut ev = vec![];
        assert!(!b.check_crushed(&g, &mut ev));
        g.set_tile(1, 1, Tile::Brick);
        assert!(b.check_crushed(&g, &mut ev));
        assert!(b.check_crushed(&g, &mut ev));
        assert_eq!(b.state, BaddieState::Crushed);
        assert_eq!(ev.len(), 1);
        assert!(matches!(ev[0], GameEvent::SpriteRemoved { actor: Actor::Baddie(0) }));
    }
}
