/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// A missing file or missing keys fall back to defaults. A file that
/// cannot be read or parsed is reported as a `ConfigError`; the caller
/// logs it and plays with `GameConfig::default()`.
///
/// Game timing is not configurable: frame counts for holes and AI ticks
/// are compile-time constants.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Level file to play; None plays the built-in level.
    pub level_file: Option<PathBuf>,
    /// Log destination; None disables logging.
    pub log_file: Option<PathBuf>,
    /// Fixed RNG seed for reproducible baddie behaviour.
    pub seed: Option<u64>,
    pub sound: bool,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub dig_left: Vec<String>,
    pub dig_right: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    level_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_sound")]
    sound: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_dig_left")]
    dig_left: Vec<String>,
    #[serde(default = "default_dig_right")]
    dig_right: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_log_file() -> String { "loderunner.log".into() }
fn default_sound() -> bool { true }

fn default_dig_left() -> Vec<String> { vec!["B".into(), "Y".into(), "L1".into()] }
fn default_dig_right() -> Vec<String> { vec!["A".into(), "X".into(), "R1".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            level_file: String::new(),
            log_file: default_log_file(),
            seed: None,
            sound: default_sound(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            dig_left: default_dig_left(),
            dig_right: default_dig_right(),
            quit: default_quit(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs)?;
        Ok(GameConfig::from_toml(toml_cfg, &search_dirs))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let level_file = non_empty(&cfg.general.level_file)
            .map(|f| resolve_data_path(f, search_dirs));
        let log_file = non_empty(&cfg.general.log_file).map(PathBuf::from);

        GameConfig {
            level_file,
            log_file,
            seed: cfg.general.seed,
            sound: cfg.general.sound,
            gamepad: GamepadConfig {
                dig_left: cfg.gamepad.dig_left,
                dig_right: cfg.gamepad.dig_right,
                quit: cfg.gamepad.quit,
            },
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}

/// Relative data paths are looked up in the search dirs; the first
/// existing match wins, otherwise the path is taken relative to CWD.
fn resolve_data_path(file: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|p| p.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Follow symlinks so an installed link still finds files next to
        // the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Parse the first config.toml found in the candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> Result<TomlConfig, ConfigError> {
    for dir in search_dirs {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            continue;
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Io { path: path.clone(), source })?;
        return toml::from_str::<TomlConfig>(&text)
            .map_err(|source| ConfigError::Parse { path, source });
    }
    Ok(TomlConfig::default())
}
