/// Entity movement and the falling cascade.
///
/// `step()` is the single entry point for voluntary movement (player input
/// and baddie AI alike). A legal step is followed by `apply_falling()`,
/// which drops the body row by row until `rules::should_fall` says stop.
///
/// The cascade resolves completely inside the call: no entity is ever left
/// mid-air across a frame. Each dropped row is reported as a `FallStep`
/// event so the presentation layer can pace the animation.

use crate::sim::event::{AudioCue, GameEvent};

use super::entity::Body;
use super::grid::Grid;
use super::rules;

impl Body {
    /// Try to move one tile by `(dx, dy)`.
    ///
    /// Clears the falling flag, rejects illegal moves without any state
    /// change, otherwise moves and runs the falling cascade. A `Fall` cue is
    /// emitted when the move ended in a fall. Returns whether the move was
    /// accepted.
    pub fn step(&mut self, grid: &Grid, dx: i32, dy: i32, events: &mut Vec<GameEvent>) -> bool {
        self.fell = false;
        let (tx, ty) = match rules::can_move(grid, self.x, self.y, dx, dy) {
            Some(t) => t,
            None => return false,
        };

        self.x = tx;
        self.y = ty;
        if dx != 0 || dy != 0 {
            events.push(GameEvent::SpriteMoved { actor: self.actor, dx, dy });
        }

        if self.apply_falling(grid, events) > 0 {
            events.push(GameEvent::Cue(AudioCue::Fall));
        }
        true
    }

    /// Drop while the fall condition holds. Returns the number of rows fallen.
    pub fn apply_falling(&mut self, grid: &Grid, events: &mut Vec<GameEvent>) -> usize {
        let mut rows = 0;
        while rules::should_fall(grid, self.x, self.y) {
            if rows == 0 {
                events.push(GameEvent::FallStart { actor: self.actor });
            }
            self.y += 1;
            rows += 1;
            events.push(GameEvent::FallStep { actor: self.actor });
        }
        if rows > 0 {
            self.fell = true;
        }
        rows
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Actor;
    use crate::domain::grid::tests::grid_from;
    use crate::domain::tile::Tile;

    fn body(x: usize, y: usize) -> Body {
        Body::new(Actor::Player, x, y)
    }

    fn count_fall_steps(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::FallStep { .. })).count()
    }

    #[test]
    fn rejected_move_changes_nothing() {
        let g = grid_from(&[
            " # ",
            "###",
        ]);
        let mut b = body(0, 0);
        b.fell = true;
        let mut ev = vec![];
        assert!(!b.step(&g, 1, 0, &mut ev));
        assert_eq!(b.pos(), (0, 0));
        assert!(!b.fell);
        assert!(ev.is_empty());
    }

    #[test]
    fn out_of_bounds_move_rejected() {
        let g = grid_from(&[
            "  ",
            "##",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert!(!b.step(&g, -1, 0, &mut ev));
        assert!(!b.step(&g, 0, -1, &mut ev));
        assert_eq!(b.pos(), (0, 0));
    }

    #[test]
    fn walk_on_ground_does_not_fall() {
        let g = grid_from(&[
            "   ",
            "###",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert!(b.step(&g, 1, 0, &mut ev));
        assert_eq!(b.pos(), (1, 0));
        assert!(!b.fell);
        assert_eq!(ev.len(), 1);
        assert!(matches!(ev[0], GameEvent::SpriteMoved { actor: Actor::Player, dx: 1, dy: 0 }));
    }

    #[test]
    fn walk_off_ledge_falls_to_floor() {
        let g = grid_from(&[
            "   ",
            "## ",
            "   ",
            "   ",
            "###",
        ]);
        let mut b = body(1, 0);
        let mut ev = vec![];
        assert!(b.step(&g, 1, 0, &mut ev));
        assert_eq!(b.pos(), (2, 3));
        assert!(b.fell);
        assert_eq!(count_fall_steps(&ev), 3);
        assert!(matches!(ev[1], GameEvent::FallStart { .. }));
        assert!(matches!(ev.last(), Some(GameEvent::Cue(AudioCue::Fall))));
    }

    #[test]
    fn fall_stops_on_bottom_row() {
        let g = grid_from(&[
            "  ",
            "  ",
            "  ",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert_eq!(b.apply_falling(&g, &mut ev), 2);
        assert_eq!(b.pos(), (0, 2));
    }

    #[test]
    fn fall_lands_on_rope_and_holds() {
        let g = grid_from(&[
            " ",
            " ",
            "-",
            " ",
            " ",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert_eq!(b.apply_falling(&g, &mut ev), 2);
        assert_eq!(b.pos(), (0, 2));
        assert_eq!(g.tile_at(0, 2), Tile::Rope);
    }

    #[test]
    fn fall_lands_on_gold_and_stops() {
        let g = grid_from(&[
            " ",
            "$",
            " ",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert_eq!(b.apply_falling(&g, &mut ev), 1);
        assert_eq!(b.pos(), (0, 1));
    }

    #[test]
    fn fall_stops_above_ladder() {
        let g = grid_from(&[
            " ",
            " ",
            "H",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert_eq!(b.apply_falling(&g, &mut ev), 1);
        assert_eq!(b.pos(), (0, 1));
    }

    #[test]
    fn on_rope_never_falls() {
        let g = grid_from(&[
            "---",
            "   ",
            "   ",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert!(b.step(&g, 1, 0, &mut ev));
        assert_eq!(b.pos(), (1, 0));
        assert!(!b.fell);
        assert_eq!(b.apply_falling(&g, &mut ev), 0);
    }

    #[test]
    fn drop_from_rope() {
        let g = grid_from(&[
            "-",
            " ",
            " ",
            "#",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert!(b.step(&g, 0, 1, &mut ev));
        assert_eq!(b.pos(), (0, 2));
        assert!(b.fell);
    }

    #[test]
    fn climb_ladder() {
        let g = grid_from(&[
            " ",
            "H",
            "H",
            "#",
        ]);
        let mut b = body(0, 2);
        let mut ev = vec![];
        assert!(b.step(&g, 0, -1, &mut ev));
        assert!(b.step(&g, 0, -1, &mut ev));
        assert_eq!(b.pos(), (0, 0));
        assert!(!b.fell);
        assert!(!b.step(&g, 0, -1, &mut ev));
    }

    #[test]
    fn zero_step_still_runs_cascade() {
        let g = grid_from(&[
            " ",
            " ",
            "#",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        assert!(b.step(&g, 0, 0, &mut ev));
        assert_eq!(b.pos(), (0, 1));
        assert!(b.fell);
        assert!(!ev.iter().any(|e| matches!(e, GameEvent::SpriteMoved { .. })));
    }

    #[test]
    fn fell_flag_resets_on_next_move() {
        let g = grid_from(&[
            "   ",
            "#  ",
            "###",
        ]);
        let mut b = body(0, 0);
        let mut ev = vec![];
        b.step(&g, 1, 0, &mut ev);
        assert!(b.fell);
        b.step(&g, 1, 0, &mut ev);
        assert!(!b.fell);
        assert_eq!(b.pos(), (2, 1));
    }
}
