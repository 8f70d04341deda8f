/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Player crush check
///   2. Movement input, then gold pickup (and the hidden-ladder reveal)
///   3. Dig input
///   4. Baddies: crush check, contact with the player, falling cascade
///   5. Scheduler tick (AI ticks, hole refills)
///   6. Win check
///
/// The order is part of the game's timing: a hole dug in frame `f` is
/// refilled during the scheduler tick of frame `f + HOLE_DELAY`, and
/// anything standing in it is found crushed at the start of the next frame.
///
/// `Quit` is not handled here; the frame loop exits before calling `step`.

use rand::Rng;

use crate::domain::entity::Facing;
use crate::domain::hole::HOLE_DELAY;
use crate::domain::tile::Tile;
use super::event::{AudioCue, GameEvent, Input, TimedEvent};
use super::world::{Phase, World};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng>(world: &mut World<R>, input: Option<Input>) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.frame += 1;

    if resolve_player_crush(world, &mut events) { return events; }
    resolve_movement(world, input, &mut events);
    resolve_dig(world, input, &mut events);
    if resolve_baddies(world, &mut events) { return events; }
    world.tick_scheduler(&mut events);
    resolve_win(world, &mut events);

    events
}

fn end_game<R>(world: &mut World<R>, phase: Phase, events: &mut Vec<GameEvent>) {
    world.phase = phase;
    let cue = match phase {
        Phase::Won => AudioCue::Win,
        _ => AudioCue::Lose,
    };
    events.push(GameEvent::Cue(cue));
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player_crush<R>(world: &mut World<R>, events: &mut Vec<GameEvent>) -> bool {
    if !world.player.is_crushed(&world.grid) { return false; }
    let (x, y) = world.player.body.pos();
    log::info!("frame {}: player crushed at ({x}, {y})", world.frame);
    end_game(world, Phase::Lost, events);
    true
}

fn resolve_movement<R>(world: &mut World<R>, input: Option<Input>, events: &mut Vec<GameEvent>) {
    let (dx, dy) = match input.and_then(Input::delta) {
        Some(d) => d,
        None => return,
    };
    world.player.body.step(&world.grid, dx, dy, events);
    if world.player.body.fell {
        let (x, y) = world.player.body.pos();
        log::debug!("frame {}: player fell to ({x}, {y})", world.frame);
    }

    let no_gold_left = world.player.pickup_gold(&mut world.grid, events);
    if no_gold_left && !world.overlay_revealed {
        world.overlay_revealed = true;
        for (x, y) in world.grid.positions_of(Tile::HiddenLadder) {
            events.push(GameEvent::OverlayRevealed { x, y });
        }
        log::info!("frame {}: all gold collected", world.frame);
    }
}

fn resolve_dig<R>(world: &mut World<R>, input: Option<Input>, events: &mut Vec<GameEvent>) {
    let side = match input {
        Some(Input::DigLeft) => Facing::Left,
        Some(Input::DigRight) => Facing::Right,
        _ => return,
    };
    if let Some(hole) = world.player.dig(side, &mut world.grid, events) {
        world.scheduler.enqueue(HOLE_DELAY, TimedEvent::HoleRefill(hole));
    }
}

// ══════════════════════════════════════════════════════════════
// Baddies
// ══════════════════════════════════════════════════════════════

/// Returns true if a baddie caught the player.
fn resolve_baddies<R>(world: &mut World<R>, events: &mut Vec<GameEvent>) -> bool {
    for i in 0..world.baddies.len() {
        let baddie = &mut world.baddies[i];
        if baddie.check_crushed(&world.grid, events) { continue; }

        if baddie.body.same_cell(&world.player.body) {
            log::info!(
                "frame {}: caught by baddie {} at ({}, {})",
                world.frame, baddie.id, baddie.body.x, baddie.body.y,
            );
            end_game(world, Phase::Lost, events);
            return true;
        }

        // A hole may have opened under a baddie that is between AI ticks.
        baddie.body.apply_falling(&world.grid, events);
    }
    false
}

// ══════════════════════════════════════════════════════════════
// Win
// ══════════════════════════════════════════════════════════════

fn resolve_win<R>(world: &mut World<R>, events: &mut Vec<GameEvent>) {
    if world.player.at_exit() {
        log::info!("frame {}: player reached the exit", world.frame);
        end_game(world, Phase::Won, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
