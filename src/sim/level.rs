/// Level data: text format parser and the built-in level.
///
/// ## Format (`.txt`):
///   Optional first line: `# Level Name`
///   Remaining lines: map rows, top row first
///
/// ## Tile legend:
///   '#' = Brick (diggable)       'H' = Ladder
///   '-' = Rope                   '$' = Gold
///   '~' = Hidden ladder          'P' = Player spawn
///   'E' = Baddie spawn           ' ' or '.' = Empty
///
/// Rows shorter than the widest row are padded with Empty. Spawn cells are
/// Empty tiles. Baddies are numbered in reading order, which is also the
/// order of their first AI ticks.
///
/// A `Level` is never mutated after parsing; `grid()` hands out the
/// runtime copy.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::grid::Grid;
use crate::domain::tile::Tile;

const PLAYER_GLYPH: char = 'P';
const BADDIE_GLYPH: char = 'E';

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown tile '{ch}' at ({x}, {y})")]
    UnknownGlyph { ch: char, x: usize, y: usize },
    #[error("level has no player spawn 'P'")]
    MissingPlayer,
    #[error("second player spawn at ({x}, {y})")]
    DuplicatePlayer { x: usize, y: usize },
    #[error("level has no map rows")]
    Empty,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub width: usize,
    pub height: usize,
    tiles: Vec<Tile>,
    pub player_spawn: (usize, usize),
    pub baddie_spawns: Vec<(usize, usize)>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

impl Level {
    /// Parse a level from its text form.
    pub fn parse(content: &str) -> Result<Level, LevelError> {
        let mut lines = content.lines().peekable();
        let mut name = String::new();
        if let Some(first) = lines.peek() {
            if is_name_line(first) {
                name = first[1..].trim().to_string();
                lines.next();
            }
        }

        let mut rows: Vec<&str> = lines.collect();
        while rows.last().map_or(false, |r| r.trim().is_empty()) {
            rows.pop();
        }
        if rows.is_empty() {
            return Err(LevelError::Empty);
        }

        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err(LevelError::Empty);
        }

        let mut tiles = vec![Tile::Empty; width * height];
        let mut player_spawn = None;
        let mut baddie_spawns = vec![];

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    PLAYER_GLYPH => {
                        if player_spawn.is_some() {
                            return Err(LevelError::DuplicatePlayer { x, y });
                        }
                        player_spawn = Some((x, y));
                    }
                    BADDIE_GLYPH => baddie_spawns.push((x, y)),
                    _ => {
                        tiles[x + y * width] = Tile::from_glyph(ch)
                            .ok_or(LevelError::UnknownGlyph { ch, x, y })?;
                    }
                }
            }
        }

        let player_spawn = player_spawn.ok_or(LevelError::MissingPlayer)?;
        if name.is_empty() {
            name = "Untitled".to_string();
        }

        Ok(Level { name, width, height, tiles, player_spawn, baddie_spawns })
    }

    /// Read and parse a level file.
    pub fn load(path: &Path) -> Result<Level, LevelError> {
        let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Level::parse(&content)
    }

    /// The built-in level.
    pub fn embedded() -> Level {
        match Level::parse(EMBEDDED_LEVEL) {
            Ok(level) => level,
            Err(e) => unreachable!("built-in level is malformed: {e}"),
        }
    }

    /// Load `level_file`, or the built-in level when there is none or it
    /// is broken.
    pub fn load_or_embedded(level_file: Option<&Path>) -> Level {
        let Some(path) = level_file else { return Level::embedded() };
        match Level::load(path) {
            Ok(level) => {
                log::info!("loaded level \"{}\" from {}", level.name, path.display());
                level
            }
            Err(e) => {
                log::warn!("{e}; using the built-in level");
                Level::embedded()
            }
        }
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        self.tiles[x + y * self.width]
    }

    /// Fresh runtime grid for a new game.
    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height, self.tiles.clone())
    }
}

/// Distinguish `# Level Name` from a map row that starts with Brick.
/// Only the first line can be a name, and only when it starts with `#`
/// followed by a space. A map whose top row would begin with Brick then
/// Empty needs a name line above it.
fn is_name_line(line: &str) -> bool {
    line.starts_with("# ")
}

// ══════════════════════════════════════════════════════════════
// Embedded level
// ══════════════════════════════════════════════════════════════

const EMBEDDED_LEVEL: &str = "\
# The Vault
#############H       H############~
#                                 ~
#               #H#          $    ~
#################H##############H##
                 H       #H#   #HE#
                 H        H    ####
-----------------H        H    ----
H              E#H#       H
H#########################H########
H-------------------      H#######H
H                         H       H
H     --      --          H     E H
H ####  ######  #H#    ---H  #####H
H #  #  #    #  #H######  H  #   #H
H #$$#  # $$$#  #H $$$ #  H  #$$$#H
H ####  #H####  ########  H  #####H
H -------H----------------H-------H
#        H                H       #
#        H       P  $     H       #
###################################
";

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
