/// Events emitted during a simulation step, plus the frame input.
///
/// The core never touches the terminal or the audio device. Everything the
/// presentation layer must do in response to a step arrives here, in the
/// order it happened.

use rand::Rng;

use crate::domain::ai::{self, BADDIE_DELAY};
use crate::domain::entity::{Actor, Baddie, Player};
use crate::domain::grid::Grid;
use crate::domain::hole::Hole;
use crate::domain::tile::Tile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A tile glyph must be drawn at this cell (hole refill).
    TileDrawn { x: usize, y: usize, tile: Tile },
    /// The tile glyph at this cell must be erased (gold taken, hole dug).
    TileCleared { x: usize, y: usize },
    SpriteMoved { actor: Actor, dx: i32, dy: i32 },
    /// A fall cascade begins; pause before the first row.
    FallStart { actor: Actor },
    /// The sprite drops one row.
    FallStep { actor: Actor },
    SpriteRemoved { actor: Actor },
    /// A hidden ladder becomes visible. Emitted once per hidden cell.
    OverlayRevealed { x: usize, y: usize },
    Cue(AudioCue),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    Gold,
    Fall,
    Dig,
    Win,
    Lose,
}

/// One player command for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Left,
    Right,
    Up,
    Down,
    DigLeft,
    DigRight,
    Quit,
}

impl Input {
    /// Movement delta, or None for dig and quit.
    pub fn delta(self) -> Option<(i32, i32)> {
        match self {
            Input::Left => Some((-1, 0)),
            Input::Right => Some((1, 0)),
            Input::Up => Some((0, -1)),
            Input::Down => Some((0, 1)),
            _ => None,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Scheduled payloads
// ══════════════════════════════════════════════════════════════

/// Everything a firing event may touch, borrowed from the `World` for
/// the duration of one scheduler tick.
pub struct FireCtx<'a, R> {
    pub grid: &'a mut Grid,
    pub player: &'a Player,
    pub baddies: &'a mut [Baddie],
    pub rng: &'a mut R,
    pub events: &'a mut Vec<GameEvent>,
}

/// Payload of a scheduler entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimedEvent {
    /// AI decision for the baddie with this id.
    BaddieTick(usize),
    HoleRefill(Hole),
}

impl TimedEvent {
    /// Run the event. Follow-up events go into `later`.
    pub fn fire<R: Rng>(self, ctx: &mut FireCtx<'_, R>, later: &mut Vec<(u32, TimedEvent)>) {
        match self {
            TimedEvent::BaddieTick(id) => {
                let baddie = &mut ctx.baddies[id];
                if !baddie.is_alive() || baddie.check_crushed(ctx.grid, ctx.events) {
                    return;
                }
                let (dx, dy) = ai::choose_step(ctx.rng, baddie.body.pos(), ctx.player.body.pos());
                baddie.body.step(ctx.grid, dx, dy, ctx.events);
                if baddie.is_alive() {
                    later.push((BADDIE_DELAY, TimedEvent::BaddieTick(id)));
                }
            }
            TimedEvent::HoleRefill(hole) => hole.refill(ctx.grid, ctx.events),
        }
    }
}
