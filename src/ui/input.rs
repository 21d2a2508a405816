/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while an arrow key is held
///   - Edge-triggered charge placement (fires on initial press only)
///
/// Terminals that support crossterm's keyboard enhancement report
/// Release events; everywhere else a key counts as released once no
/// Press/Repeat has arrived for a short window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Without Release events, a key with no Press/Repeat for this long
/// counts as released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// When each held key last produced a Press/Repeat event.
    pressed_at: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events from the most recent drain, for meta-key checks.
    raw_events: Vec<KeyEvent>,

    /// Honor Release events. Only set when keyboard enhancement is
    /// confirmed working; timeout expiry covers the rest.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            pressed_at: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                _ => continue,
            };
            self.raw_events.push(key);

            if key.kind == KeyEventKind::Release {
                if self.honor_release {
                    self.pressed_at.remove(&key.code);
                }
                continue;
            }
            // Press or Repeat
            if self.pressed_at.insert(key.code, Instant::now()).is_none() {
                self.fresh_presses.push(key.code);
            }
        }

        let now = Instant::now();
        self.pressed_at
            .retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is any of these keys currently held? Used for continuous movement.
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.pressed_at.contains_key(c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Did any raw event this frame carry Ctrl+C?
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}
