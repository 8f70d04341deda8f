/// World: the complete state of a running game.
///
/// ## Ownership
///
/// The world owns the runtime `Grid`, the event `Scheduler`, the `Player`
/// and every `Baddie`. Entities never hold the grid or the scheduler;
/// each operation borrows the fields it needs, and a scheduler tick splits
/// the world into a `FireCtx` of disjoint borrows.
///
/// ## Tile layers
///
///   - `Level` — the layout as loaded. Never mutated.
///   - `grid`  — the live terrain. Dig, refill and gold pickup write here.
///
/// ## Randomness
///
/// The RNG is a type parameter so tests can fix a seed. The game uses
/// `Pcg32`.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::domain::ai::BADDIE_DELAY;
use crate::domain::entity::{Baddie, Player};
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;

use super::event::{FireCtx, GameEvent, TimedEvent};
use super::level::Level;
use super::scheduler::Scheduler;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

pub struct World<R = Pcg32> {
    pub grid: Grid,
    pub scheduler: Scheduler<TimedEvent>,
    pub player: Player,
    pub baddies: Vec<Baddie>,
    rng: R,
    pub phase: Phase,
    /// Frames stepped so far.
    pub frame: u64,
    /// Hidden ladders have been shown (happens once per game).
    pub overlay_revealed: bool,
}

impl<R: Rng> World<R> {
    /// Start a game on `level`. Every baddie gets its first AI tick after
    /// `BADDIE_DELAY`, enqueued in spawn order.
    pub fn new(level: &Level, rng: R) -> Self {
        let (px, py) = level.player_spawn;
        let baddies: Vec<Baddie> = level.baddie_spawns.iter()
            .enumerate()
            .map(|(id, &(x, y))| Baddie::new(id, x, y))
            .collect();

        let mut scheduler = Scheduler::new();
        for b in &baddies {
            scheduler.enqueue(BADDIE_DELAY, TimedEvent::BaddieTick(b.id));
        }

        log::info!(
            "new game on \"{}\" ({}x{}), {} baddies",
            level.name, level.width, level.height, baddies.len(),
        );

        World {
            grid: level.grid(),
            scheduler,
            player: Player::new(px, py),
            baddies,
            rng,
            phase: Phase::Playing,
            frame: 0,
            overlay_revealed: false,
        }
    }

    pub fn gold_left(&self) -> usize {
        self.grid.count(Tile::Gold)
    }

    pub fn living_baddies(&self) -> usize {
        self.baddies.iter().filter(|b| b.is_alive()).count()
    }

    /// One scheduler tick: fire due AI ticks and refills, age the rest.
    pub(crate) fn tick_scheduler(&mut self, events: &mut Vec<GameEvent>) {
        let World { grid, scheduler, player, baddies, rng, .. } = self;
        let mut ctx = FireCtx {
            grid,
            player,
            baddies: &mut baddies[..],
            rng,
            events,
        };
        scheduler.tick(|event, later| event.fire(&mut ctx, later));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use crate::domain::entity::Actor;

    /// Build a world from a level diagram with a fixed seed.
    pub(crate) fn world_from(rows: &[&str]) -> World<Pcg32> {
        let level = Level::parse(&rows.join("\n")).expect("test level must parse");
        World::new(&level, Pcg32::seed_from_u64(7))
    }

    #[test]
    fn new_world_matches_level() {
        let w = world_from(&[
            " E  ",
            "P $E",
            "####",
        ]);
        assert_eq!(w.player.body.pos(), (0, 1));
        assert_eq!(w.baddies.len(), 2);
        assert_eq!(w.baddies[0].body.pos(), (1, 0));
        assert_eq!(w.baddies[1].body.pos(), (3, 1));
        assert_eq!(w.gold_left(), 1);
        assert_eq!(w.living_baddies(), 2);
        assert_eq!(w.phase, Phase::Playing);
        assert!(!w.overlay_revealed);
    }

    #[test]
    fn every_baddie_has_one_pending_tick() {
        let w = world_from(&[
            "EEE ",
            " P  ",
            "####",
        ]);
        assert_eq!(w.scheduler.len(), 3);
    }

    #[test]
    fn baddie_ticks_fire_in_spawn_order_and_repeat() {
        let mut w = world_from(&[
            "E   E",
            "  P  ",
            "#####",
        ]);
        let tick = |id| TimedEvent::BaddieTick(id);
        assert_eq!(
            w.scheduler.entries(),
            vec![(BADDIE_DELAY, tick(0)), (BADDIE_DELAY, tick(1))],
        );

        let mut ev = vec![];
        for _ in 0..BADDIE_DELAY {
            w.tick_scheduler(&mut ev);
        }
        assert_eq!(w.scheduler.entries(), vec![(0, tick(0)), (0, tick(1))]);

        // Both fire in spawn order and come back one full delay later,
        // aged by the same tick.
        w.tick_scheduler(&mut ev);
        assert_eq!(
            w.scheduler.entries(),
            vec![(BADDIE_DELAY - 1, tick(0)), (BADDIE_DELAY - 1, tick(1))],
        );
        let movers: Vec<Actor> = ev.iter()
            .filter_map(|e| match e {
                GameEvent::SpriteMoved { actor, .. } | GameEvent::FallStep { actor } => Some(*actor),
                _ => None,
            })
            .collect();
        let mut in_order = movers.clone();
        in_order.sort_by_key(|a| match a {
            Actor::Baddie(id) => *id,
            Actor::Player => usize::MAX,
        });
        assert_eq!(movers, in_order);
        assert_eq!(movers.first(), Some(&Actor::Baddie(0)));
        assert_eq!(movers.last(), Some(&Actor::Baddie(1)));

        for _ in 0..BADDIE_DELAY {
            w.tick_scheduler(&mut ev);
        }
        assert_eq!(
            w.scheduler.entries(),
            vec![(BADDIE_DELAY - 1, tick(0)), (BADDIE_DELAY - 1, tick(1))],
        );
    }

    #[test]
    fn first_ai_tick_after_baddie_delay() {
        let mut w = world_from(&[
            "    ",
            "P  E",
            "####",
        ]);
        let mut ev = vec![];
        for _ in 0..BADDIE_DELAY {
            w.tick_scheduler(&mut ev);
        }
        assert_eq!(w.baddies[0].body.pos(), (3, 1));
        assert!(ev.is_empty());
        // Tick 26 fires; the baddie either waits or steps left.
        w.tick_scheduler(&mut ev);
        let x = w.baddies[0].body.x;
        assert!(x == 3 || x == 2);
        assert_eq!(w.scheduler.len(), 1);
    }
}
