pub const KEY_COUNT: usize = 16;

/// Hex keypad state. The host writes it between cycles; the interpreter
/// only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
        }
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        self.keys[(key & 0xF) as usize] = pressed;
    }

    pub fn set_all(&mut self, keys: [bool; KEY_COUNT]) {
        self.keys = keys;
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    /// Register values above 0xF never match a key.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// Highest-numbered key currently held, if any.
    pub fn last_pressed(&self) -> Option<u8> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, pressed)| **pressed)
            .map(|(key, _)| key as u8)
            .last()
    }
}
