/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::grid::{Command, Dir};
use sim::event::GameEvent;
use sim::level::{self, LevelError};
use sim::step::{self, TickOutcome};
use sim::world::{Screen, World};
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Freeze-frame length after the player dies, in ticks.
const DYING_TICKS: u32 = 12;
/// Freeze-frame length after clearing an arena, in ticks.
const CLEARED_TICKS: u32 = 10;

fn main() {
    let config = GameConfig::load();

    let mut world = World::new();
    world.lives = config.starting_lives;

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Grid Blast!");
    println!("Final Score: {}", world.score);
}

fn game_loop(
    world: &mut World,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    let mut screen = Screen::Title;
    let mut level_name = String::new();
    let mut freeze_timer: u32 = 0;
    // Edge-triggered: a press between ticks is delivered on the next tick.
    let mut pending_charge = false;

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        match screen {
            Screen::Title => {
                if kb.was_pressed(KeyCode::Esc) {
                    break;
                }
                if kb.any_pressed(KEYS_CONFIRM) {
                    start_new_run(world, config);
                    match level::load_level(world, 0, config) {
                        Ok(name) => {
                            level_name = name;
                            screen = Screen::Playing;
                        }
                        Err(LevelError::NotFound(_)) => {
                            return Err("no levels available".into());
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
            Screen::GameOver | Screen::Won => {
                if kb.was_pressed(KeyCode::Esc) {
                    break;
                }
                if kb.any_pressed(KEYS_CONFIRM) {
                    screen = Screen::Title;
                }
            }
            Screen::Playing => {
                if kb.was_pressed(KeyCode::Esc) {
                    screen = Screen::Title;
                    pending_charge = false;
                    continue;
                }
                if kb.any_pressed(KEYS_CHARGE) {
                    pending_charge = true;
                }
            }
            Screen::Dying | Screen::Cleared => {}
        }

        if last_tick.elapsed() >= tick_rate {
            match screen {
                Screen::Playing => {
                    let input = if std::mem::take(&mut pending_charge) {
                        Some(Command::DropCharge)
                    } else {
                        detect_movement(&kb).map(Command::Move)
                    };

                    let (outcome, events) = step::step(world, input);
                    process_sound_events(sound, &events);

                    match outcome {
                        TickOutcome::Continue => {}
                        TickOutcome::PlayerDied => {
                            screen = Screen::Dying;
                            freeze_timer = DYING_TICKS;
                        }
                        TickOutcome::LevelFinished => {
                            screen = Screen::Cleared;
                            freeze_timer = CLEARED_TICKS;
                        }
                    }
                }
                Screen::Dying => {
                    freeze_timer = freeze_timer.saturating_sub(1);
                    if freeze_timer == 0 {
                        if world.lives == 0 {
                            screen = Screen::GameOver;
                        } else {
                            level_name = level::load_level(world, world.level, config)?;
                            screen = Screen::Playing;
                        }
                    }
                }
                Screen::Cleared => {
                    freeze_timer = freeze_timer.saturating_sub(1);
                    if freeze_timer == 0 {
                        match level::load_level(world, world.level + 1, config) {
                            Ok(name) => {
                                level_name = name;
                                screen = Screen::Playing;
                            }
                            Err(LevelError::NotFound(_)) => screen = Screen::Won,
                            Err(e) => return Err(e.into()),
                        }
                    }
                }
                _ => {}
            }
            last_tick = Instant::now();
        }

        renderer.render(world, screen, &level_name)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Fresh run: new world and RNG, score zeroed, lives from config.
fn start_new_run(world: &mut World, config: &GameConfig) {
    *world = World::new();
    world.lives = config.starting_lives;
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::ChargePlaced { .. } => sfx.play_place(),
            GameEvent::ChargeBurst { .. } => sfx.play_burst(),
            GameEvent::BugKilled { .. } => sfx.play_bug_down(),
            GameEvent::GoodieCollected { .. } => sfx.play_goodie(),
            GameEvent::PlayerKilled => sfx.play_die(),
            GameEvent::HatchRevealed => sfx.play_reveal(),
            GameEvent::StageCleared => sfx.play_clear(),
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CHARGE: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Char('z'), KeyCode::Char('Z')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];

fn detect_movement(kb: &InputState) -> Option<Dir> {
    if kb.any_held(KEYS_UP) {
        Some(Dir::Up)
    } else if kb.any_held(KEYS_DOWN) {
        Some(Dir::Down)
    } else if kb.any_held(KEYS_LEFT) {
        Some(Dir::Left)
    } else if kb.any_held(KEYS_RIGHT) {
        Some(Dir::Right)
    } else {
        None
    }
}
