/// Keyboard key identifier.
///
/// Only the keys the application reacts to get their own variant. Everything
/// else is carried as `Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True for OS auto-repeat while the key is held.
        repeat: bool,
    },
    /// Window gained (`true`) or lost (`false`) keyboard focus.
    Focused(bool),
}
