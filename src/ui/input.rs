/// Keyboard input source.
///
/// The game consumes at most one logical `Input` per frame. Terminal key
/// events are drained every frame and mapped; mapped inputs wait in a
/// short queue so a quick double tap is not lost, while key-repeat floods
/// are capped. `Quit` jumps the queue.
///
/// Release events are ignored: keyboard enhancement is never enabled, so
/// most terminals only report Press and Repeat.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::event::Input;

/// Inputs older than this many frames' worth are dropped.
const MAX_PENDING: usize = 3;

pub struct KeyboardInput {
    pending: VecDeque<Input>,
    quit: bool,
    /// Any key at all was pressed since the last `take_any_key()`.
    any_key: bool,
}

impl KeyboardInput {
    pub fn new() -> Self {
        KeyboardInput {
            pending: VecDeque::with_capacity(MAX_PENDING),
            quit: false,
            any_key: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before `next_input()`.
    pub fn drain_events(&mut self) -> io::Result<()> {
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                self.push_key(key);
            }
        }
        Ok(())
    }

    /// The input for this frame, if any.
    pub fn next_input(&mut self) -> Option<Input> {
        if self.quit {
            return Some(Input::Quit);
        }
        self.pending.pop_front()
    }

    /// Was any key pressed since the last call? Used on the end screens.
    pub fn take_any_key(&mut self) -> bool {
        self.pending.clear();
        std::mem::take(&mut self.any_key)
    }

    fn push_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.any_key = true;
        match map_key(&key) {
            Some(Input::Quit) => self.quit = true,
            Some(input) => {
                if self.pending.len() == MAX_PENDING {
                    self.pending.pop_front();
                }
                self.pending.push_back(input);
            }
            None => {}
        }
    }
}

/// Translate one key event into a game input.
pub fn map_key(key: &KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Input::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Input::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Input::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Input::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Input::Down),
        KeyCode::Char('z') | KeyCode::Char('Z') => Some(Input::DigLeft),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(Input::DigRight),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}
