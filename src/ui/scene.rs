/// Scene: what the terminal currently shows.
///
/// A presentation-side copy of tile kinds and sprite positions. The core
/// never reads it; it changes only through the draw calls below, which the
/// frame loop makes while applying a step's `GameEvent`s in order.
///
/// Hidden ladders start masked and are drawn as empty space until
/// `reveal_hidden_overlay()` lifts the mask for that cell.

use std::collections::HashSet;

use crate::domain::entity::Actor;
use crate::domain::tile::Tile;
use crate::sim::event::GameEvent;
use crate::sim::level::Level;

pub struct Scene {
    pub name: String,
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    masked: HashSet<(usize, usize)>,
    player: Option<(usize, usize)>,
    /// Indexed by baddie id; None once removed.
    baddies: Vec<Option<(usize, usize)>>,
}

impl Scene {
    pub fn from_level(level: &Level) -> Self {
        let mut tiles = Vec::with_capacity(level.width * level.height);
        let mut masked = HashSet::new();
        for y in 0..level.height {
            for x in 0..level.width {
                let tile = level.tile_at(x, y);
                if tile == Tile::HiddenLadder {
                    masked.insert((x, y));
                }
                tiles.push(tile);
            }
        }
        Scene {
            name: level.name.clone(),
            width: level.width,
            height: level.height,
            tiles,
            masked,
            player: Some(level.player_spawn),
            baddies: level.baddie_spawns.iter().map(|&p| Some(p)).collect(),
        }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    /// The tile as it should look: masked hidden ladders read as Empty.
    pub fn visible_tile(&self, x: usize, y: usize) -> Tile {
        if self.masked.contains(&(x, y)) {
            return Tile::Empty;
        }
        self.tiles[y * self.width + x]
    }

    pub fn sprite_pos(&self, actor: Actor) -> Option<(usize, usize)> {
        match actor {
            Actor::Player => self.player,
            Actor::Baddie(id) => self.baddies.get(id).copied().flatten(),
        }
    }

    /// The sprite drawn at a cell. The player is drawn over baddies.
    pub fn sprite_at(&self, x: usize, y: usize) -> Option<Actor> {
        if self.player == Some((x, y)) {
            return Some(Actor::Player);
        }
        self.baddies.iter()
            .position(|b| *b == Some((x, y)))
            .map(Actor::Baddie)
    }

    // ── Draw calls ──

    pub fn draw_tile(&mut self, x: usize, y: usize, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    pub fn undraw_tile(&mut self, x: usize, y: usize) {
        self.draw_tile(x, y, Tile::Empty);
    }

    pub fn move_sprite(&mut self, actor: Actor, dx: i32, dy: i32) {
        let (w, h) = (self.width as i32, self.height as i32);
        let slot = match actor {
            Actor::Player => &mut self.player,
            Actor::Baddie(id) => match self.baddies.get_mut(id) {
                Some(slot) => slot,
                None => return,
            },
        };
        if let Some((x, y)) = *slot {
            let nx = (x as i32 + dx).clamp(0, w - 1);
            let ny = (y as i32 + dy).clamp(0, h - 1);
            *slot = Some((nx as usize, ny as usize));
        }
    }

    pub fn remove_sprite(&mut self, actor: Actor) {
        match actor {
            Actor::Player => self.player = None,
            Actor::Baddie(id) => {
                if let Some(slot) = self.baddies.get_mut(id) {
                    *slot = None;
                }
            }
        }
    }

    pub fn reveal_hidden_overlay(&mut self, x: usize, y: usize) {
        self.masked.remove(&(x, y));
    }

    /// Apply one event's drawing. Sound cues and the fall pause marker
    /// have nothing to draw.
    pub fn apply(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::TileDrawn { x, y, tile } => self.draw_tile(x, y, tile),
            GameEvent::TileCleared { x, y } => self.undraw_tile(x, y),
            GameEvent::SpriteMoved { actor, dx, dy } => self.move_sprite(actor, dx, dy),
            GameEvent::FallStep { actor } => self.move_sprite(actor, 0, 1),
            GameEvent::SpriteRemoved { actor } => self.remove_sprite(actor),
            GameEvent::OverlayRevealed { x, y } => self.reveal_hidden_overlay(x, y),
            GameEvent::FallStart { .. } | GameEvent::Cue(_) => {}
        }
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use crate::sim::event::Input;
    use crate::sim::step::step;
    use crate::sim::world::World;

    fn level(rows: &[&str]) -> Level {
        Level::parse(&rows.join("\n")).expect("test level must parse")
    }

    #[test]
    fn starts_from_level_layout() {
        let s = Scene::from_level(&level(&[
            "~ E",
            "P$H",
            "###",
        ]));
        assert_eq!(s.visible_tile(0, 0), Tile::Empty);
        assert_eq!(s.visible_tile(1, 1), Tile::Gold);
        assert_eq!(s.visible_tile(2, 1), Tile::Ladder);
        assert_eq!(s.sprite_at(0, 1), Some(Actor::Player));
        assert_eq!(s.sprite_at(2, 0), Some(Actor::Baddie(0)));
        assert_eq!(s.sprite_at(1, 0), None);
    }

    #[test]
    fn hidden_ladder_shows_after_reveal() {
        let mut s = Scene::from_level(&level(&[
            "~  ",
            "P  ",
            "###",
        ]));
        s.reveal_hidden_overlay(0, 0);
        assert_eq!(s.visible_tile(0, 0), Tile::HiddenLadder);
    }

    #[test]
    fn removed_sprite_is_gone_and_ignores_moves() {
        let mut s = Scene::from_level(&level(&[
            "   ",
            "P E",
            "###",
        ]));
        s.remove_sprite(Actor::Baddie(0));
        s.move_sprite(Actor::Baddie(0), -1, 0);
        assert_eq!(s.sprite_pos(Actor::Baddie(0)), None);
        assert_eq!(s.sprite_at(2, 1), None);
        assert_eq!(s.sprite_at(1, 1), None);
    }

    #[test]
    fn player_drawn_over_baddie() {
        let mut s = Scene::from_level(&level(&[
            "   ",
            "PE ",
            "###",
        ]));
        s.move_sprite(Actor::Player, 1, 0);
        assert_eq!(s.sprite_at(1, 1), Some(Actor::Player));
    }

    #[test]
    fn tracks_world_through_events() {
        let lvl = level(&[
            "      ",
            " P$   ",
            "######",
            "######",
        ]);
        let mut world = World::new(&lvl, Pcg32::seed_from_u64(3));
        let mut scene = Scene::from_level(&lvl);

        let inputs = [Input::Right, Input::DigRight, Input::Right, Input::Right];
        for input in inputs {
            for ev in step(&mut world, Some(input)) {
                scene.apply(&ev);
            }
        }

        assert_eq!(world.player.body.pos(), (3, 2));
        assert_eq!(scene.sprite_pos(Actor::Player), Some((3, 2)));
        for y in 0..lvl.height {
            for x in 0..lvl.width {
                assert_eq!(scene.visible_tile(x, y), world.grid.tile_at(x, y), "cell ({x}, {y})");
            }
        }
    }
}
