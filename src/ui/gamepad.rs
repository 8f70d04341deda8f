/// Gamepad input source using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Movement (one step per press)
///   B / Y / L1            →  Dig Left
///   A / X / R1            →  Dig Right
///   Select                →  Quit
///
/// Everything is edge-triggered: a press yields one `Input`, holding does
/// not repeat. Without the `gamepad` feature this compiles to a stub that
/// never reports input.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::sim::event::Input;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq, Eq)]
struct ActionMap {
    dig_left: Vec<Btn>,
    dig_right: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            dig_left:  vec![Btn::B, Btn::Y, Btn::L1],
            dig_right: vec![Btn::A, Btn::X, Btn::R1],
            quit:      vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an action left with no buttons keeps
    /// its default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let mut map = ActionMap::default();
        let dl = parse_list(&cfg.dig_left);
        if !dl.is_empty() { map.dig_left = dl; }
        let dr = parse_list(&cfg.dig_right);
        if !dr.is_empty() { map.dig_right = dr; }
        let q = parse_list(&cfg.quit);
        if !q.is_empty() { map.quit = q; }
        map
    }
}

/// Edge flags for the four movement directions (d-pad and stick merged).
#[derive(Clone, Copy, Debug, Default)]
struct Dirs {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last `update()`.
    just_pressed: [bool; BTN_COUNT],
    moves: Dirs,

    /// Stick position and its digital state last frame.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_held: Dirs,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            just_pressed: [false; BTN_COUNT],
            moves: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            stick_held: Dirs::default(),
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    /// Collect this frame's presses. Call once per frame.
    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.moves = Dirs::default();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// The input for this frame, if any. Quit first, then dig, then moves.
    pub fn next_input(&self) -> Option<Input> {
        if self.any_just_pressed(&self.action_map.quit) { return Some(Input::Quit); }
        if self.any_just_pressed(&self.action_map.dig_left) { return Some(Input::DigLeft); }
        if self.any_just_pressed(&self.action_map.dig_right) { return Some(Input::DigRight); }
        let m = self.moves;
        if m.left { return Some(Input::Left); }
        if m.right { return Some(Input::Right); }
        if m.up { return Some(Input::Up); }
        if m.down { return Some(Input::Down); }
        None
    }

    /// Was any button or direction pressed this frame?
    pub fn any_pressed(&self) -> bool {
        let m = self.moves;
        self.just_pressed.iter().any(|&p| p) || m.up || m.down || m.left || m.right
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        // Stick crossing the deadzone counts as a press.
        let now = Dirs {
            left: self.stick_x < -STICK_DEADZONE,
            right: self.stick_x > STICK_DEADZONE,
            up: self.stick_y > STICK_DEADZONE,
            down: self.stick_y < -STICK_DEADZONE,
        };
        let prev = self.stick_held;
        if now.left && !prev.left { self.moves.left = true; }
        if now.right && !prev.right { self.moves.right = true; }
        if now.up && !prev.up { self.moves.up = true; }
        if now.down && !prev.down { self.moves.down = true; }
        self.stick_held = now;
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, gilrs_btn: Button) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp    => { self.moves.up = true; return; }
            Button::DPadDown  => { self.moves.down = true; return; }
            Button::DPadLeft  => { self.moves.left = true; return; }
            Button::DPadRight => { self.moves.right = true; return; }
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.just_pressed[btn_index(btn)] = true;
        }
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[btn_index(b)])
    }
}
