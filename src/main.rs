/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use config::GameConfig;
use sim::event::{GameEvent, Input};
use sim::level::Level;
use sim::step;
use sim::world::{Phase, World};
use ui::gamepad::GamepadState;
use ui::input::KeyboardInput;
use ui::renderer::{Hud, Renderer};
use ui::scene::Scene;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(10);

/// Pause before the first row of a fall.
const FALL_START_PAUSE: Duration = Duration::from_millis(80);
/// Pause after each row of a fall.
const FALL_STEP_PAUSE: Duration = Duration::from_millis(50);

fn main() {
    // The logger needs the config, so a config error is reported once it runs.
    let (config, config_err) = match GameConfig::load() {
        Ok(c) => (c, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };
    init_logger(&config);
    if let Some(e) = config_err {
        log::warn!("{e}; using default settings");
    }

    let level = Level::load_or_embedded(config.level_file.as_deref());
    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("seed {seed}");
    let mut world = World::new(&level, Pcg32::seed_from_u64(seed));
    let mut scene = Scene::from_level(&level);

    let mut sound = if config.sound { SoundEngine::new() } else { None };
    if let Some(sfx) = sound.as_mut() {
        sfx.start_music();
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        // Raw mode may be half set up.
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        std::process::exit(1);
    }

    let result = game_loop(&mut world, &mut scene, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => {
            log::info!("game over after {} frames: {:?}", world.frame, world.phase);
            if let Some(line) = farewell(world.phase) {
                println!("{line}");
            }
        }
        Err(e) => {
            log::error!("game error: {e}");
            eprintln!("Game error: {e}");
            std::process::exit(1);
        }
    }
}

/// Line printed after the terminal is restored. Quitting prints nothing.
fn farewell(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Won => Some("Thanks for playing Lode Runner! (won)"),
        Phase::Lost => Some("Thanks for playing Lode Runner! (lost)"),
        Phase::Playing => None,
    }
}

/// Log to the configured file. The terminal is in raw alternate-screen
/// mode while playing, so stderr is never a target.
fn init_logger(config: &GameConfig) {
    let Some(path) = &config.log_file else { return };
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", path.display());
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn game_loop(
    world: &mut World,
    scene: &mut Scene,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = KeyboardInput::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }

    renderer.render(scene, &hud(world))?;

    while world.phase == Phase::Playing {
        kb.drain_events()?;
        gp.update();

        let input = kb.next_input().or_else(|| gp.next_input());
        if input == Some(Input::Quit) {
            return Ok(());
        }

        let events = step::step(world, input);
        present(&events, world, scene, renderer, sound)?;

        renderer.render(scene, &hud(world))?;
        std::thread::sleep(FRAME_SLEEP);
    }

    // End screen: wait for one acknowledgement. Keys pressed during play
    // do not count.
    kb.drain_events()?;
    kb.take_any_key();
    loop {
        kb.drain_events()?;
        gp.update();
        if kb.take_any_key() || gp.any_pressed() {
            return Ok(());
        }
        std::thread::sleep(FRAME_SLEEP);
    }
}

/// Apply a step's events to the scene and sound engine in order. Falls
/// are animated row by row; the world already holds the final position.
fn present(
    events: &[GameEvent],
    world: &World,
    scene: &mut Scene,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> std::io::Result<()> {
    for event in events {
        scene.apply(event);
        match event {
            GameEvent::Cue(cue) => {
                if let Some(sfx) = sound {
                    sfx.play(*cue);
                }
            }
            GameEvent::FallStart { .. } => {
                renderer.render(scene, &hud(world))?;
                std::thread::sleep(FALL_START_PAUSE);
            }
            GameEvent::FallStep { .. } => {
                renderer.render(scene, &hud(world))?;
                std::thread::sleep(FALL_STEP_PAUSE);
            }
            _ => {}
        }
    }
    Ok(())
}

fn hud(world: &World) -> Hud {
    Hud {
        gold_left: world.gold_left(),
        baddies: world.living_baddies(),
        frame: world.frame,
        phase: world.phase,
    }
}
