// Key debouncing for action and navigation keys
//
// Terminals differ in whether they report key release, and holding a key
// produces a stream of press events. Action keys (Enter, F-keys, Esc, Tab)
// fire once per press; on terminals without release events a held key
// fires again only after ACTION_DEBOUNCE. Scroll keys repeat after an
// initial delay. Typed characters never pass through here.

use crossterm::event::KeyCode;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Minimum gap between two firings of a held action key
const ACTION_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBehavior {
    /// Fire once per press
    Action,
    /// Fire on press, then every `interval` once `delay` has passed
    Repeat { delay: Duration, interval: Duration },
}

impl KeyBehavior {
    pub fn scroll() -> Self {
        Self::Repeat {
            delay: Duration::from_millis(400),
            interval: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Held {
    since: Instant,
    last_fired: Instant,
}

/// Decides whether a key event should trigger its action
pub struct InputHandler {
    behaviors: HashMap<KeyCode, KeyBehavior>,
    held: HashMap<KeyCode, Held>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            held: HashMap::new(),
        }
    }

    pub fn configure(&mut self, keys: &[KeyCode], behavior: KeyBehavior) {
        for key in keys {
            self.behaviors.insert(*key, behavior);
        }
    }

    /// Key bindings of the console
    pub fn for_console() -> Self {
        let mut handler = Self::new();
        handler.configure(
            &[
                KeyCode::Up,
                KeyCode::Down,
                KeyCode::PageUp,
                KeyCode::PageDown,
            ],
            KeyBehavior::scroll(),
        );
        handler.configure(
            &[
                KeyCode::Enter,
                KeyCode::Esc,
                KeyCode::Tab,
                KeyCode::BackTab,
                KeyCode::Left,
                KeyCode::Right,
                KeyCode::F(2),
                KeyCode::F(3),
                KeyCode::F(4),
                KeyCode::F(5),
            ],
            KeyBehavior::Action,
        );
        handler
    }

    /// Returns true if the press should trigger the key's action
    pub fn press(&mut self, key: KeyCode) -> bool {
        self.press_at(key, Instant::now())
    }

    fn press_at(&mut self, key: KeyCode, now: Instant) -> bool {
        let behavior = self
            .behaviors
            .get(&key)
            .copied()
            .unwrap_or(KeyBehavior::Action);

        let Some(held) = self.held.get_mut(&key) else {
            self.held.insert(
                key,
                Held {
                    since: now,
                    last_fired: now,
                },
            );
            return true;
        };

        let fire = match behavior {
            KeyBehavior::Action => now.duration_since(held.last_fired) >= ACTION_DEBOUNCE,
            KeyBehavior::Repeat { delay, interval } => {
                now.duration_since(held.since) >= delay
                    && now.duration_since(held.last_fired) >= interval
            }
        };
        if fire {
            held.last_fired = now;
        }
        fire
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::for_console()
    }
}
