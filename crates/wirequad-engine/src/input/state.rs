use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Current keyboard state for the window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Release events are not delivered to an unfocused window.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    self.keys_down.insert(*key);
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, repeat: false }
    }

    #[test]
    fn press_then_release() {
        let mut s = InputState::default();

        s.apply_event(&key(Key::ArrowLeft, KeyState::Pressed));
        assert!(s.key_down(Key::ArrowLeft));
        assert!(!s.key_down(Key::ArrowRight));

        s.apply_event(&key(Key::ArrowLeft, KeyState::Released));
        assert!(!s.key_down(Key::ArrowLeft));
    }

    #[test]
    fn both_arrows_can_be_held() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::ArrowLeft, KeyState::Pressed));
        s.apply_event(&key(Key::ArrowRight, KeyState::Pressed));

        assert!(s.key_down(Key::ArrowLeft));
        assert!(s.key_down(Key::ArrowRight));
    }

    #[test]
    fn repeat_keeps_key_held() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::ArrowRight, KeyState::Pressed));
        s.apply_event(&InputEvent::Key {
            key: Key::ArrowRight,
            state: KeyState::Pressed,
            repeat: true,
        });

        assert!(s.key_down(Key::ArrowRight));
        assert_eq!(s.keys_down.len(), 1);
    }

    #[test]
    fn releasing_unheld_key_is_noop() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::Unknown(42), KeyState::Released));
        assert!(s.keys_down.is_empty());
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Focused(true));
        s.apply_event(&key(Key::ArrowLeft, KeyState::Pressed));

        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.focused);
        assert!(!s.key_down(Key::ArrowLeft));
    }
}
