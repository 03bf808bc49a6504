//! Keyboard shortcuts.
//!
//! Every binding uses the command modifier, which is Ctrl or Super (Cmd on
//! macOS). Other modifiers are ignored. Character keys compare exactly, so
//! `s` matches but `S` does not.

/// Set of active modifiers for a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        super_key: false,
    };

    pub const SUPER: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        super_key: true,
    };

    fn has_command(self) -> bool {
        self.ctrl || self.super_key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Character(char),
}

/// A key press as reported by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Editor commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    Generate,
    /// Opens the export chooser when a diagram is shown.
    OpenExport,
    LoadRandomSample,
    ToggleTheme,
}

/// Maps key presses to [`Shortcut`]s.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(Key, Shortcut)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            bindings: vec![
                (Key::Enter, Shortcut::Generate),
                (Key::Character('s'), Shortcut::OpenExport),
                (Key::Character('l'), Shortcut::LoadRandomSample),
                (Key::Character('d'), Shortcut::ToggleTheme),
            ],
        }
    }
}

impl Keymap {
    /// Returns the shortcut bound to `press`.
    ///
    /// A match means the surface's default handling of the key must be
    /// suppressed, whether or not the command ends up doing anything.
    pub fn resolve(&self, press: KeyPress) -> Option<Shortcut> {
        if !press.modifiers.has_command() {
            return None;
        }
        self.bindings
            .iter()
            .find(|(key, _)| *key == press.key)
            .map(|(_, shortcut)| *shortcut)
    }
}
