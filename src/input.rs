//! Logical input actions and held-key repeat timing
//!
//! A held movement or soft-drop key fires once on press, once more after the
//! initial delay, then every repeat delay until it is released. Timers are
//! advanced by frame time, so behavior is deterministic for a fixed tick rate.

use std::time::Duration;

/// Default delay before the first repeat of a held key
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(450);
/// Default delay between subsequent repeats
pub const DEFAULT_REPEAT_DELAY: Duration = Duration::from_millis(400);

/// Logical actions a player can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

impl Action {
    /// Whether holding the key repeats the action
    pub fn repeats(&self) -> bool {
        !matches!(self, Action::Rotate)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct HeldKey {
    held: Duration,
    repeating: bool,
}

/// Repeat timers for the keys that auto-repeat
#[derive(Debug, Clone)]
pub struct KeyRepeat {
    left: Option<HeldKey>,
    right: Option<HeldKey>,
    down: Option<HeldKey>,
    initial_delay: Duration,
    repeat_delay: Duration,
}

impl Default for KeyRepeat {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_DELAY, DEFAULT_REPEAT_DELAY)
    }
}

impl KeyRepeat {
    pub fn new(initial_delay: Duration, repeat_delay: Duration) -> Self {
        Self {
            left: None,
            right: None,
            down: None,
            initial_delay,
            repeat_delay,
        }
    }

    fn slot(&mut self, action: Action) -> Option<&mut Option<HeldKey>> {
        if !action.repeats() {
            return None;
        }
        Some(match action {
            Action::MoveLeft => &mut self.left,
            Action::MoveRight => &mut self.right,
            _ => &mut self.down,
        })
    }

    /// Handle a key press. Returns the action to perform immediately, if any.
    ///
    /// A press on a key that is already held (terminal auto-repeat) is ignored.
    pub fn key_down(&mut self, action: Action) -> Option<Action> {
        let Some(slot) = self.slot(action) else {
            return Some(action);
        };
        if slot.is_some() {
            return None;
        }
        *slot = Some(HeldKey::default());

        // Cancel opposite direction
        match action {
            Action::MoveLeft => self.right = None,
            Action::MoveRight => self.left = None,
            _ => {}
        }
        Some(action)
    }

    pub fn key_up(&mut self, action: Action) {
        if let Some(slot) = self.slot(action) {
            *slot = None;
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.left.is_some(),
            Action::MoveRight => self.right.is_some(),
            Action::SoftDrop => self.down.is_some(),
            Action::Rotate => false,
        }
    }

    /// Advance held keys by `dt` and return the repeats that fired
    pub fn update(&mut self, dt: Duration) -> Vec<Action> {
        let mut actions = Vec::new();
        let (initial, repeat) = (self.initial_delay, self.repeat_delay);

        for (state, action) in [
            (&mut self.left, Action::MoveLeft),
            (&mut self.right, Action::MoveRight),
            (&mut self.down, Action::SoftDrop),
        ] {
            if let Some(key) = state {
                if process_repeat(key, dt, initial, repeat) {
                    actions.push(action);
                }
            }
        }

        actions
    }

    /// Restart the timers of held keys from the initial delay, keeping them held
    pub fn reset_timers(&mut self) {
        for key in [&mut self.left, &mut self.right, &mut self.down]
            .into_iter()
            .flatten()
        {
            *key = HeldKey::default();
        }
    }

    /// Release every held key
    pub fn clear(&mut self) {
        self.left = None;
        self.right = None;
        self.down = None;
    }
}

/// Advance one key, returns true if its action should fire
fn process_repeat(key: &mut HeldKey, dt: Duration, initial: Duration, repeat: Duration) -> bool {
    key.held += dt;
    let threshold = if key.repeating { repeat } else { initial };
    if key.held >= threshold {
        key.held = Duration::ZERO;
        key.repeating = true;
        return true;
    }
    false
}
