/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Brick,        // Solid + Diggable
    Ladder,       // Climbable
    Rope,         // Hangable (horizontal bar)
    Gold,         // Pickup target
    HiddenLadder, // Climbable; drawn masked until all gold is collected
}

impl Tile {
    /// Blocks every move into it.
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Brick)
    }

    /// Can this tile be dug?
    pub fn is_diggable(self) -> bool {
        matches!(self, Tile::Brick)
    }

    /// Can an entity move up from this tile?
    /// HiddenLadder climbs the same whether or not its mask is shown.
    pub fn is_climbable(self) -> bool {
        matches!(self, Tile::Ladder | Tile::HiddenLadder)
    }

    /// An entity whose current tile is a rope never falls.
    pub fn is_hangable(self) -> bool {
        matches!(self, Tile::Rope)
    }

    /// Does an entity standing above this tile drop into it?
    pub fn is_fall_through(self) -> bool {
        matches!(self, Tile::Empty | Tile::Rope | Tile::Gold)
    }

    pub fn is_gold(self) -> bool {
        matches!(self, Tile::Gold)
    }

    /// Level-file glyph for this tile.
    #[cfg(test)]
    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Brick => '#',
            Tile::Ladder => 'H',
            Tile::Rope => '-',
            Tile::Gold => '$',
            Tile::HiddenLadder => '~',
        }
    }

    /// Parse a level-file glyph. Spawn markers are handled by the level loader.
    pub fn from_glyph(ch: char) -> Option<Tile> {
        match ch {
            ' ' | '.' => Some(Tile::Empty),
            '#' => Some(Tile::Brick),
            'H' => Some(Tile::Ladder),
            '-' => Some(Tile::Rope),
            '$' => Some(Tile::Gold),
            '~' => Some(Tile::HiddenLadder),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Tile; 6] = [
        Tile::Empty, Tile::Brick, Tile::Ladder,
        Tile::Rope, Tile::Gold, Tile::HiddenLadder,
    ];

    #[test]
    fn glyphs_map_back_to_the_same_tile() {
        for t in ALL {
            assert_eq!(Tile::from_glyph(t.glyph()), Some(t));
        }
        assert_eq!(Tile::from_glyph('.'), Some(Tile::Empty));
        assert_eq!(Tile::from_glyph('?'), None);
    }

    #[test]
    fn only_brick_is_solid() {
        for t in ALL {
            assert_eq!(t.is_solid(), t == Tile::Brick);
        }
    }

    #[test]
    fn hidden_ladder_climbs_like_ladder() {
        assert!(Tile::Ladder.is_climbable());
        assert!(Tile::HiddenLadder.is_climbable());
        assert!(!Tile::Rope.is_climbable());
    }

    #[test]
    fn fall_through_set() {
        assert!(Tile::Empty.is_fall_through());
        assert!(Tile::Rope.is_fall_through());
        assert!(Tile::Gold.is_fall_through());
        assert!(!Tile::Brick.is_fall_through());
        assert!(!Tile::Ladder.is_fall_through());
        assert!(!Tile::HiddenLadder.is_fall_through());
    }
}
