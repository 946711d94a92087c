use minifb::Key;

use chip8vm::keypad::KEY_COUNT;

// Keypad index -> host key
//
// 1 2 3 C        1 2 3 4
// 4 5 6 D   <-   Q W E R
// 7 8 9 E        A S D F
// A 0 B F        Z X C V
const KEY_MAP: [Key; KEY_COUNT] = [
    Key::X,
    Key::Key1,
    Key::Key2,
    Key::Key3,
    Key::Q,
    Key::W,
    Key::E,
    Key::A,
    Key::S,
    Key::D,
    Key::Z,
    Key::C,
    Key::Key4,
    Key::R,
    Key::F,
    Key::V,
];

pub fn key_to_num(key: Key) -> Option<u8> {
    KEY_MAP.iter().position(|&k| k == key).map(|n| n as u8)
}

/// Keypad state from the keys currently held down.
pub fn read_keypad(held: &[Key]) -> [bool; KEY_COUNT] {
    let mut keys = [false; KEY_COUNT];
    for &key in held {
        if let Some(n) = key_to_num(key) {
            keys[n as usize] = true;
        }
    }
    keys
}
