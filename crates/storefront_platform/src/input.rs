//! Input event types for keyboard activation

/// Keys the page controllers react to.
///
/// Everything else collapses into [`Key::Char`] or [`Key::Unknown`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Enter,
    Escape,

    /// Printable character
    Char(char),

    /// Unknown key
    Unknown,
}

impl Key {
    /// Keys that activate a focused button-like control
    pub fn is_activation(&self) -> bool {
        matches!(self, Key::Space | Key::Enter)
    }
}

/// Keyboard event (key down only; the controllers never track releases)
#[derive(Clone, Debug)]
pub struct KeyboardEvent {
    /// The key that was pressed
    pub key: Key,
}

impl KeyboardEvent {
    pub fn new(key: Key) -> Self {
        Self { key }
    }
}
